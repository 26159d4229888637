use std::time::Duration;

use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use bevy_common_assets::json::JsonAssetPlugin;
use constants::camera::CAMERA_FOV_DEGREES;
use constants::render::MIN_RENDER_INTERVAL;

// Crate engine modules
use crate::engine::assets::building_registry::BuildingRegistry;
use crate::engine::assets::role_map::RoleConfig;
use crate::engine::camera::navigator::{
    ActiveFlight, FlyToBuilding, FlyToEvent, FlyToPart, advance_flight, handle_fly_commands,
    handle_fly_to,
};
use crate::engine::camera::pad::{PadMove, handle_pad_moves, pad_keyboard_shortcuts};
use crate::engine::camera::rig::{CameraRig, orbit_controller, sync_camera_rig};
use crate::engine::core::app_state::AppState;
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::model_loader::{start_loading, watch_role_config, watch_scene_ready};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::render::schedule::{
    RenderSchedule, flush_render_requests, request_render_on_resize,
};
use crate::engine::scene::grouping::build_building_groups;
use crate::engine::scene::lighting::spawn_lighting;
// Crate tools modules
use crate::tools::picker::{PickEvent, pointer_pick};
use crate::tools::selection::{
    ActivePopup, DismissPopup, SelectionState, apply_initial_focus, handle_dismiss, handle_picks,
};
// Web RPC bridge
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers RoleConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<RoleConfig>::new(&["roles.json"]))
        .add_plugins(WebRpcPlugin)
        // Render on demand: winit only wakes on input or at the coalescing
        // interval, and frames are presented via RequestRedraw.
        .insert_resource(WinitSettings {
            focused_mode: UpdateMode::reactive(Duration::from_secs_f64(MIN_RENDER_INTERVAL)),
            unfocused_mode: UpdateMode::reactive_low_power(Duration::from_millis(500)),
        })
        .insert_resource(ClearColor(Color::srgb(0.53, 0.81, 0.92)))
        .init_resource::<RenderSchedule>()
        .init_resource::<BuildingRegistry>()
        .init_resource::<SelectionState>()
        .init_resource::<ActivePopup>()
        .init_resource::<ActiveFlight>()
        .init_resource::<LoadingProgress>()
        .add_event::<PickEvent>()
        .add_event::<FlyToEvent>()
        .add_event::<FlyToBuilding>()
        .add_event::<FlyToPart>()
        .add_event::<PadMove>()
        .add_event::<DismissPopup>()
        .add_systems(Startup, (setup_viewer, spawn_lighting, start_loading))
        .add_systems(
            Update,
            (
                watch_scene_ready.run_if(in_state(AppState::Loading)),
                build_building_groups.run_if(in_state(AppState::SceneReady)),
                watch_role_config,
                apply_initial_focus.run_if(in_state(AppState::Running)),
            ),
        )
        .add_systems(
            Update,
            (pointer_pick, handle_picks)
                .chain()
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(
            Update,
            (
                orbit_controller,
                pad_keyboard_shortcuts,
                handle_pad_moves,
                handle_fly_commands,
                handle_fly_to,
                advance_flight,
                sync_camera_rig,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (handle_dismiss, request_render_on_resize, flush_render_requests),
        );

    #[cfg(not(target_arch = "wasm32"))]
    {
        use crate::tools::info_panel::{
            popup_keyboard_shortcuts, spawn_info_panel, update_info_panel,
        };
        use crate::tools::selection::{PendingLookup, poll_pending_lookup};

        app.init_resource::<PendingLookup>()
            .add_systems(Startup, spawn_info_panel)
            .add_systems(
                Update,
                (
                    poll_pending_lookup,
                    popup_keyboard_shortcuts,
                    update_info_panel.run_if(resource_changed::<ActivePopup>),
                ),
            );
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

/// Spawn the viewer camera and its rig. The rig is the single source of
/// truth for camera placement; navigation before it exists is a no-op.
fn setup_viewer(mut commands: Commands) {
    let position = Vec3::new(0.0, 20.0, 40.0);
    let target = Vec3::new(0.0, 5.0, 0.0);

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(position).looking_at(target, Vec3::Y),
    ));
    commands.insert_resource(CameraRig::new(position, target));
}
