/// Shared configuration for building-group construction

/// Leaf meshes whose world bounding-box diagonal is shorter than this are
/// decorative clutter (railings, signage, vegetation props) and never become
/// buildings (scene units)
pub const MICRO_GEOMETRY_THRESHOLD: f32 = 0.8;

/// Last-resort bounding radius when a group's union volume is degenerate
pub const FALLBACK_GROUP_RADIUS: f32 = 5.0;

/// Prefix used when a mesh carries no authored or node name
pub const SYNTHESIZED_LABEL_PREFIX: &str = "Building";

/// GLTF extras key for an explicitly authored building name
pub const BUILDING_NAME_EXTRA: &str = "buildingName";

/// GLTF extras key for a generic authored name
pub const GENERIC_NAME_EXTRA: &str = "name";
