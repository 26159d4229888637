/// Shared configuration for camera navigation and fly-to animation
use bevy::math::Vec3;

/// Number of discrete interpolation steps in an animated fly-to
pub const FLY_FRAMES: u32 = 45;

/// Steps used when flying to an individual part from the building list
pub const PART_FLY_FRAMES: u32 = 40;

/// Extra framing margin applied to the fitted distance for group fly-to
pub const GROUP_MARGIN_FACTOR: f32 = 1.2;

/// Fallback padding (scene units) beyond the fitted distance for single parts
pub const DEFAULT_PART_PADDING: f32 = 2.0;

/// Distance subtracted from an occluding hit so the camera stops short of it
pub const OCCLUSION_BACKOFF: f32 = 0.5;

/// Hits closer than this to the aim point are the target's own surface
pub const OCCLUSION_SELF_HIT_EPSILON: f32 = 0.02;

/// Camera-relative translation applied per directional-pad press (scene units)
pub const PAD_STEP: f32 = 5.0;

/// Polar angle is clamped to [POLAR_MIN, POLAR_MAX] radians, measured from the
/// vertical axis, so the camera never tilts under the ground plane
pub const POLAR_MIN: f32 = 0.0001;
pub const POLAR_MAX: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Viewing direction used when snapping onto the initial focus group
pub const INITIAL_FOCUS_DIRECTION: Vec3 = Vec3::new(1.0, 0.6, 1.0);

/// Vertical field of view of the viewer camera (degrees)
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
