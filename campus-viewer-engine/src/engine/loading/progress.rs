use bevy::prelude::*;

#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub model_centred: bool,
    pub model_failed: bool,
    pub role_config_done: bool,
    pub initial_focus_done: bool,
}
