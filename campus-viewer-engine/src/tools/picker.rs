use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::loading::model_loader::ModelRoot;
use crate::engine::scene::hierarchy::is_descendant_of;

/// Nearest mesh found under the pointer.
#[derive(Debug, Clone, Copy)]
pub struct PickHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
}

/// Outcome of one pointer press: the nearest hit, or `None` for empty space.
/// An empty-space pick is a defined outcome, not an error.
#[derive(Event, Debug, Clone)]
pub struct PickEvent {
    pub hit: Option<PickHit>,
    pub screen: Vec2,
}

/// Resolve a primary-button press into the nearest scene mesh under the
/// cursor.
///
/// This is a pure query: it casts a camera ray through the cursor against the
/// model subtree and reports what it found. Selection, popups and camera
/// moves are the business of whoever reads [`PickEvent`].
pub fn pointer_pick(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    roots: Query<Entity, With<ModelRoot>>,
    parents: Query<&ChildOf>,
    mut raycast: MeshRayCast,
    mut picks: EventWriter<PickEvent>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_pos) else {
        return;
    };
    // clicks before the model spawned are ignored outright
    let Ok(root) = roots.single() else {
        return;
    };

    let filter = |entity: Entity| is_descendant_of(entity, root, &parents);
    let settings = MeshRayCastSettings::default()
        .with_filter(&filter)
        .with_visibility(RayCastVisibility::Any)
        .always_early_exit();

    let hit = raycast
        .cast_ray(ray, &settings)
        .first()
        .map(|(entity, hit)| PickHit {
            entity: *entity,
            distance: hit.distance,
            point: hit.point,
        });

    picks.write(PickEvent {
        hit,
        screen: cursor_pos,
    });
}
