use bevy::prelude::*;

/// Top-level lifecycle of the viewer.
///
/// `Loading` waits for the scene asset; `SceneReady` lets transforms
/// propagate for one tick after the model is centred; `Running` is the
/// interactive state. A failed scene load still reaches `Running` with an
/// empty building registry.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    SceneReady,
    Running,
}
