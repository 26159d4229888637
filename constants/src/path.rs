/// Asset paths resolved against the Bevy asset root

/// Packaged campus scene (single GLB containing every building mesh)
pub const SCENE_ASSET_PATH: &str = "models/campus.glb";

/// Deployment-time role mapping and static building metadata
pub const ROLE_CONFIG_PATH: &str = "config/campus.roles.json";
