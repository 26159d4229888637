use bevy::prelude::*;
use constants::camera::PAD_STEP;

use crate::engine::camera::rig::CameraRig;
use crate::engine::render::schedule::RenderSchedule;

/// One press on the directional control pad. Moves are relative to the
/// camera's heading but stay in the horizontal plane.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMove {
    Forward,
    Backward,
    Left,
    Right,
}

impl PadMove {
    /// Convert string identifier to a pad move for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "forward" => Some(Self::Forward),
            "backward" | "back" => Some(Self::Backward),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// (forward, right) translation amounts in scene units.
    pub fn amounts(self) -> (f32, f32) {
        match self {
            Self::Forward => (PAD_STEP, 0.0),
            Self::Backward => (-PAD_STEP, 0.0),
            Self::Left => (0.0, -PAD_STEP),
            Self::Right => (0.0, PAD_STEP),
        }
    }
}

/// Camera-relative horizontal basis: the viewing direction with its vertical
/// component stripped, and the matching right vector. `None` when the camera
/// looks straight down and no horizontal heading exists.
pub fn horizontal_basis(position: Vec3, target: Vec3) -> Option<(Vec3, Vec3)> {
    let forward = (target - position).with_y(0.0).try_normalize()?;
    let right = forward.cross(Vec3::Y).normalize();
    Some((forward, right))
}

/// Apply pad moves to the rig, shifting eye and target together.
pub fn handle_pad_moves(
    mut moves: EventReader<PadMove>,
    rig: Option<ResMut<CameraRig>>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    let Some(mut rig) = rig else {
        return;
    };

    let mut moved = false;
    for pad_move in moves.read() {
        let Some((forward, right)) = horizontal_basis(rig.position, rig.target) else {
            continue;
        };
        let (forward_amount, right_amount) = pad_move.amounts();
        let delta = forward * forward_amount + right * right_amount;
        rig.position += delta;
        rig.target += delta;
        moved = true;
    }

    if moved {
        schedule.request(time.elapsed_secs_f64());
    }
}

/// Arrow keys mirror the on-screen pad on native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn pad_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut moves: EventWriter<PadMove>,
) {
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        moves.write(PadMove::Forward);
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        moves.write(PadMove::Backward);
    }
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        moves.write(PadMove::Left);
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        moves.write(PadMove::Right);
    }
}

/// Placeholder for WASM builds where the embedding page owns the pad.
#[cfg(target_arch = "wasm32")]
pub fn pad_keyboard_shortcuts() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_horizontal_and_orthonormal() {
        let (forward, right) =
            horizontal_basis(Vec3::new(0.0, 25.0, 40.0), Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert_eq!(forward.y, 0.0);
        assert_eq!(right.y, 0.0);
        assert!((forward.length() - 1.0).abs() < 1e-6);
        assert!(forward.dot(right).abs() < 1e-6);
    }

    #[test]
    fn looking_straight_down_has_no_heading() {
        assert!(horizontal_basis(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO).is_none());
    }

    #[test]
    fn each_press_moves_a_fixed_step() {
        let (forward, right) = horizontal_basis(Vec3::new(3.0, 10.0, 9.0), Vec3::ZERO).unwrap();
        for pad_move in [PadMove::Forward, PadMove::Backward, PadMove::Left, PadMove::Right] {
            let (f, r) = pad_move.amounts();
            let delta = forward * f + right * r;
            assert!((delta.length() - PAD_STEP).abs() < 1e-5);
            assert_eq!(delta.y, 0.0);
        }
    }

    #[test]
    fn rpc_identifiers_round_trip() {
        assert_eq!(PadMove::from_string("forward"), Some(PadMove::Forward));
        assert_eq!(PadMove::from_string("Back"), Some(PadMove::Backward));
        assert_eq!(PadMove::from_string("sideways"), None);
    }
}
