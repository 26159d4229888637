use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use constants::camera::{
    CAMERA_FOV_DEGREES, FLY_FRAMES, GROUP_MARGIN_FACTOR, OCCLUSION_BACKOFF,
    OCCLUSION_SELF_HIT_EPSILON, PART_FLY_FRAMES,
};

use crate::engine::assets::building_registry::{BuildingGroup, BuildingRegistry};
use crate::engine::camera::rig::CameraRig;
use crate::engine::render::schedule::RenderSchedule;
use crate::engine::scene::bounds::WorldBounds;
use crate::engine::scene::hierarchy::collect_with_descendants;

/// What a fly-to frames: either a whole building group or one ungrouped part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlyKind {
    Group,
    /// Single-node fly-to. The target subtree is excluded from the occlusion
    /// ray, and `padding` both extends the fitted distance and floors the
    /// occlusion clamp.
    Part { exclude: Entity, padding: f32 },
}

/// Geometric fly-to target, decoupled from how it was selected.
#[derive(Debug, Clone, Copy)]
pub struct FlyTarget {
    pub center: Vec3,
    pub radius: f32,
    pub vertical_offset: f32,
    pub kind: FlyKind,
}

impl FlyTarget {
    pub fn group(group: &BuildingGroup) -> Self {
        Self {
            center: group.center_world,
            radius: group.bounding_radius,
            vertical_offset: group.vertical_offset,
            kind: FlyKind::Group,
        }
    }

    /// Target for a single part. Degenerate bounds fall back to half the
    /// longest extent, then to one scene unit.
    pub fn part(entity: Entity, bounds: WorldBounds, padding: f32) -> Self {
        let mut radius = bounds.sphere_radius();
        if radius <= 0.0 {
            radius = bounds.size().max_element() * 0.5;
        }
        if radius <= 0.0 {
            radius = 1.0;
        }
        Self {
            center: bounds.center(),
            radius,
            vertical_offset: 0.0,
            kind: FlyKind::Part {
                exclude: entity,
                padding,
            },
        }
    }

    pub fn aim_point(&self) -> Vec3 {
        self.center + Vec3::Y * self.vertical_offset
    }
}

/// Request to reposition the camera. `direction` overrides the preserved
/// viewing angle; `frames` only matters when `animate` is set.
#[derive(Event, Debug, Clone)]
pub struct FlyToEvent {
    pub target: FlyTarget,
    pub animate: bool,
    pub frames: u32,
    pub direction: Option<Vec3>,
}

/// Fly the camera to a building group by registry id.
#[derive(Event, Debug, Clone)]
pub struct FlyToBuilding {
    pub id: String,
}

/// Fly the camera to one member mesh of a group.
#[derive(Event, Debug, Clone)]
pub struct FlyToPart {
    pub building: String,
    pub index: usize,
}

/// A time-bounded camera interpolation. Owned by [`ActiveFlight`]; replacing
/// the resource's slot is all it takes to cancel an in-progress flight.
#[derive(Debug, Clone, Copy)]
pub struct CameraAnimation {
    pub start_position: Vec3,
    pub start_target: Vec3,
    pub end_position: Vec3,
    pub end_target: Vec3,
    pub total_steps: u32,
    pub current_step: u32,
}

impl CameraAnimation {
    pub fn new(
        start_position: Vec3,
        start_target: Vec3,
        end_position: Vec3,
        end_target: Vec3,
        total_steps: u32,
    ) -> Self {
        Self {
            start_position,
            start_target,
            end_position,
            end_target,
            total_steps: total_steps.max(1),
            current_step: 0,
        }
    }

    /// Advance one step and return the interpolated (position, target).
    /// Plain linear interpolation, per-step fraction `step / total`.
    pub fn advance(&mut self) -> (Vec3, Vec3) {
        self.current_step += 1;
        let t = (self.current_step as f32 / self.total_steps as f32).min(1.0);
        (
            self.start_position.lerp(self.end_position, t),
            self.start_target.lerp(self.end_target, t),
        )
    }

    pub fn finished(&self) -> bool {
        self.current_step >= self.total_steps
    }
}

/// At most one camera animation exists; a new fly-to overwrites the slot and
/// the superseded flight simply never advances again.
#[derive(Resource, Debug, Default)]
pub struct ActiveFlight(pub Option<CameraAnimation>);

/// Distance at which a sphere of `radius` fills the vertical field of view.
pub fn fit_distance(radius: f32, fov: f32) -> f32 {
    (radius / (fov * 0.5).sin()).abs()
}

/// Shorten a desired camera distance so intervening geometry at
/// `hit_distance` cannot contain the camera. Never drops below `padding`.
pub fn clamp_occluded(desired: f32, hit_distance: f32, padding: f32) -> f32 {
    let safe = hit_distance - OCCLUSION_BACKOFF;
    if safe < desired { safe.max(padding) } else { desired }
}

/// Translate registry-level fly commands into geometric fly-to requests.
pub fn handle_fly_commands(
    mut building_events: EventReader<FlyToBuilding>,
    mut part_events: EventReader<FlyToPart>,
    registry: Res<BuildingRegistry>,
    bounds_query: Query<(&Aabb, &GlobalTransform)>,
    mut fly: EventWriter<FlyToEvent>,
) {
    for event in building_events.read() {
        let Some(group) = registry.get(&event.id) else {
            warn!("Fly-to requested for unknown building '{}'", event.id);
            continue;
        };
        fly.write(FlyToEvent {
            target: FlyTarget::group(group),
            animate: true,
            frames: FLY_FRAMES,
            direction: None,
        });
    }

    for event in part_events.read() {
        let Some(group) = registry.get(&event.building) else {
            warn!("Fly-to requested for unknown building '{}'", event.building);
            continue;
        };
        let Some(&member) = group.members.get(event.index) else {
            warn!(
                "Building '{}' has no part {}",
                event.building, event.index
            );
            continue;
        };
        let Ok((aabb, transform)) = bounds_query.get(member) else {
            continue;
        };
        fly.write(FlyToEvent {
            target: FlyTarget::part(
                member,
                WorldBounds::from_local_aabb(aabb, transform),
                group.vertical_offset,
            ),
            animate: true,
            frames: PART_FLY_FRAMES,
            direction: None,
        });
    }
}

/// Resolve fly-to requests into a snap or an animation.
///
/// Computes the aim point and fitted distance, applies the occlusion clamp
/// for single parts, widens the clip planes to cover the new distance, then
/// either snaps the rig or installs a [`CameraAnimation`] (cancelling any
/// previous one). Without a camera rig the request is dropped silently.
pub fn handle_fly_to(
    mut events: EventReader<FlyToEvent>,
    rig: Option<ResMut<CameraRig>>,
    mut flight: ResMut<ActiveFlight>,
    mut projections: Query<&mut Projection, With<Camera3d>>,
    mut raycast: MeshRayCast,
    children: Query<&Children>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    let Some(mut rig) = rig else {
        events.clear();
        return;
    };

    for event in events.read() {
        let aim = event.target.aim_point();
        let fov = projections
            .iter()
            .find_map(|projection| match projection {
                Projection::Perspective(perspective) => Some(perspective.fov),
                _ => None,
            })
            .unwrap_or(CAMERA_FOV_DEGREES.to_radians());

        let fitted = fit_distance(event.target.radius, fov);
        let mut desired = match event.target.kind {
            FlyKind::Group => fitted * GROUP_MARGIN_FACTOR,
            FlyKind::Part { padding, .. } => fitted + padding,
        };

        let direction = event
            .direction
            .and_then(|d| d.try_normalize())
            .unwrap_or_else(|| rig.view_offset_dir());

        // Single parts sit between other buildings; make sure nothing solid
        // stands between the aim point and where the camera will end up.
        if let FlyKind::Part { exclude, padding } = event.target.kind {
            let excluded = collect_with_descendants(exclude, &children);
            let filter = |entity: Entity| !excluded.contains(&entity);
            let settings = MeshRayCastSettings::default()
                .with_filter(&filter)
                .with_visibility(RayCastVisibility::Any)
                .never_early_exit();
            if let Ok(ray_direction) = Dir3::new(direction) {
                let ray = Ray3d::new(aim + direction * 0.01, ray_direction);
                let hits = raycast.cast_ray(ray, &settings);
                if let Some((_, hit)) = hits
                    .iter()
                    .find(|(_, hit)| hit.distance > OCCLUSION_SELF_HIT_EPSILON)
                {
                    desired = clamp_occluded(desired, hit.distance, padding);
                }
            }
        }

        let end_position = aim + direction * desired;

        for mut projection in &mut projections {
            if let Projection::Perspective(perspective) = projection.as_mut() {
                perspective.near = perspective.near.min(desired / 100.0).max(0.01);
                perspective.far = perspective.far.max(desired * 10.0);
            }
        }

        if event.animate {
            flight.0 = Some(CameraAnimation::new(
                rig.position,
                rig.target,
                end_position,
                aim,
                event.frames,
            ));
        } else {
            flight.0 = None;
            rig.position = end_position;
            rig.target = aim;
        }
        schedule.request(time.elapsed_secs_f64());
    }
}

/// Advance the active flight by one step per tick, requesting a render for
/// each. The slot empties itself on the final step.
pub fn advance_flight(
    mut flight: ResMut<ActiveFlight>,
    rig: Option<ResMut<CameraRig>>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    if flight.0.is_none() {
        return;
    }
    let Some(mut rig) = rig else {
        return;
    };
    let Some(animation) = flight.0.as_mut() else {
        return;
    };

    let (position, target) = animation.advance();
    rig.position = position;
    rig.target = target;
    schedule.request(time.elapsed_secs_f64());

    if animation.finished() {
        flight.0 = None;
    }
}
