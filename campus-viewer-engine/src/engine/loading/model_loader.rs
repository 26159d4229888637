use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::scene::{SceneInstance, SceneSpawner};
use constants::camera::GROUP_MARGIN_FACTOR;
use constants::path::{ROLE_CONFIG_PATH, SCENE_ASSET_PATH};

use crate::engine::assets::role_map::RoleConfig;
use crate::engine::camera::navigator::fit_distance;
use crate::engine::camera::rig::CameraRig;
use crate::engine::core::app_state::AppState;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::render::schedule::RenderSchedule;
use crate::engine::scene::bounds::WorldBounds;
use crate::rpc::web_rpc::WebRpcInterface;

/// Marks the spawned root of the campus scene. Grouping and picking only
/// consider entities below this root.
#[derive(Component)]
pub struct ModelRoot;

/// Handles kept alive for the whole session so the assets never unload.
#[derive(Resource, Default)]
pub struct SceneHandles {
    pub scene: Handle<Scene>,
    pub roles: Handle<RoleConfig>,
}

/// Kick off both asynchronous loads and spawn the (still empty) scene root.
pub fn start_loading(mut commands: Commands, asset_server: Res<AssetServer>) {
    println!("Loading campus scene from: {SCENE_ASSET_PATH}");
    let scene: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(SCENE_ASSET_PATH));
    let roles: Handle<RoleConfig> = asset_server.load(ROLE_CONFIG_PATH);

    commands.spawn((
        SceneRoot(scene.clone()),
        Transform::IDENTITY,
        Visibility::default(),
        ModelRoot,
    ));
    commands.insert_resource(SceneHandles { scene, roles });
}

/// Wait for the scene instance, then centre the model on the origin and fit
/// the camera to its bounding sphere.
///
/// Transitions to `SceneReady` so transform propagation gets one tick before
/// grouping reads world bounds. A failed load is reported once and drops the
/// viewer straight into `Running` with no buildings.
pub fn watch_scene_ready(
    mut progress: ResMut<LoadingProgress>,
    handles: Res<SceneHandles>,
    asset_server: Res<AssetServer>,
    scene_spawner: Res<SceneSpawner>,
    roots: Query<(Entity, Option<&SceneInstance>), With<ModelRoot>>,
    mut root_transforms: Query<&mut Transform, With<ModelRoot>>,
    meshes: Query<(&Aabb, &GlobalTransform), With<Mesh3d>>,
    rig: Option<ResMut<CameraRig>>,
    mut projections: Query<&mut Projection, With<Camera3d>>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
    mut rpc: ResMut<WebRpcInterface>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&handles.scene) {
        error!("Error loading campus scene: {err}");
        rpc.send_notification(
            "model_load_failed",
            serde_json::json!({ "path": SCENE_ASSET_PATH }),
        );
        progress.model_failed = true;
        // stay interactive: empty registry, empty picks
        next_state.set(AppState::Running);
        return;
    }

    let Ok((_, instance)) = roots.single() else {
        return;
    };
    let Some(instance) = instance else {
        return;
    };
    if !scene_spawner.instance_is_ready(**instance) {
        return;
    }

    let union = meshes
        .iter()
        .map(|(aabb, transform)| WorldBounds::from_local_aabb(aabb, transform))
        .reduce(WorldBounds::union);
    let Some(union) = union else {
        println!("✓ Campus scene loaded (no geometry)");
        next_state.set(AppState::SceneReady);
        return;
    };

    // centre the model so orbiting starts around the campus middle
    if let Ok(mut transform) = root_transforms.single_mut() {
        transform.translation -= union.center();
    }

    let sphere_radius = union.sphere_radius();
    let radius = if sphere_radius > 0.0 { sphere_radius } else { 10.0 };
    let fov = projections
        .iter()
        .find_map(|projection| match projection {
            Projection::Perspective(perspective) => Some(perspective.fov),
            _ => None,
        })
        .unwrap_or(constants::camera::CAMERA_FOV_DEGREES.to_radians());
    let distance = fit_distance(radius, fov);

    if let Some(mut rig) = rig {
        rig.position = Vec3::new(
            0.0,
            radius * 0.6 + distance * 0.05,
            distance * GROUP_MARGIN_FACTOR,
        );
        rig.target = Vec3::ZERO;
    }
    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.near = (distance / 100.0).max(0.1);
            perspective.far = distance * 10.0;
        }
    }

    progress.model_centred = true;
    println!("✓ Campus scene loaded ({radius:.1} unit bounding radius)");
    schedule.request(time.elapsed_secs_f64());
    next_state.set(AppState::SceneReady);
}

/// Promote the role configuration asset to a resource once it arrives, and
/// stand up the info client against its base URL.
pub fn watch_role_config(
    mut progress: ResMut<LoadingProgress>,
    handles: Res<SceneHandles>,
    configs: Res<Assets<RoleConfig>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    if progress.role_config_done {
        return;
    }

    if let Some(config) = configs.get(&handles.roles) {
        println!(
            "✓ Role configuration loaded ({} assignments, {} profiles)",
            config.assignments.len(),
            config.roles.len()
        );
        #[cfg(not(target_arch = "wasm32"))]
        commands.insert_resource(crate::lookup::InfoClient::new(&config.info_base_url));
        commands.insert_resource(config.clone());
        progress.role_config_done = true;
    } else if matches!(
        asset_server.get_load_state(&handles.roles),
        Some(LoadState::Failed(_))
    ) {
        warn!("Role configuration missing; buildings will show local metadata only");
        progress.role_config_done = true;
    }
}
