use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::camera::{POLAR_MAX, POLAR_MIN};

use crate::engine::render::schedule::RenderSchedule;

/// Orbit-style camera state: an eye position circling a look-at target.
///
/// Every component that moves the camera (orbit input, D-pad, fly-to
/// animation) mutates this resource; one sync system writes it to the camera
/// transform. The resource is inserted at bootstrap, so navigation requests
/// arriving before then fall through as silent no-ops.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraRig {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Unit vector from the look-at target towards the camera. This is the
    /// viewing angle fly-to preserves when no explicit direction is given.
    pub fn view_offset_dir(&self) -> Vec3 {
        (self.position - self.target)
            .try_normalize()
            .unwrap_or(Vec3::Z)
    }

    /// Rotate the eye around the target. The polar angle is clamped so the
    /// camera stays at or above the horizon, azimuth is unrestricted.
    pub fn orbit(&mut self, delta: Vec2) {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;

        let offset = self.position - self.target;
        let radius = offset.length().max(0.001);
        let mut yaw = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        yaw -= delta.x * yaw_sens;
        polar = (polar + delta.y * pitch_sens).clamp(POLAR_MIN, POLAR_MAX);

        let sin_polar = polar.sin();
        self.position = self.target
            + Vec3::new(
                radius * sin_polar * yaw.sin(),
                radius * polar.cos(),
                radius * sin_polar * yaw.cos(),
            );
    }

    /// Dolly towards or away from the target. Positive scroll moves in.
    pub fn zoom(&mut self, scroll: f32) {
        let offset = self.position - self.target;
        let radius = (offset.length() * (1.0 - scroll * 0.1)).max(0.5);
        self.position = self.target + offset.normalize_or(Vec3::Z) * radius;
    }

    /// Slide target and eye together across the ground plane.
    pub fn pan(&mut self, delta: Vec2) {
        let Some((forward, right)) = super::pad::horizontal_basis(self.position, self.target)
        else {
            return;
        };
        let scale = self.distance() * 0.0015;
        let world_delta = right * (-delta.x * scale) + forward * (delta.y * scale);
        self.position += world_delta;
        self.target += world_delta;
    }
}

/// Mouse-driven orbit controls: left-drag rotates, right-drag pans, wheel
/// zooms. Any applied change requests a render.
pub fn orbit_controller(
    rig: Option<ResMut<CameraRig>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    let Some(mut rig) = rig else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Mouse wheel scroll accumulation (pixel and line scroll)
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    let mut changed = false;
    if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
        rig.orbit(mouse_delta);
        changed = true;
    } else if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        rig.pan(mouse_delta);
        changed = true;
    }
    if scroll_accum.abs() > f32::EPSILON {
        rig.zoom(scroll_accum);
        changed = true;
    }

    if changed {
        schedule.request(time.elapsed_secs_f64());
    }
}

/// Write the rig state to the camera transform whenever it moved.
pub fn sync_camera_rig(
    rig: Option<Res<CameraRig>>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let Some(rig) = rig else {
        return;
    };
    if !rig.is_changed() {
        return;
    }
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    transform.translation = rig.position;
    transform.look_at(rig.target, Vec3::Y);
}
