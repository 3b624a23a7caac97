//! Renderer adapter
//!
//! The 3D scene graph sits behind [`SceneRenderer`]. The scene sends it
//! plain [`RenderCommand`]s and never reads scene-graph state back, apart
//! from whether the render loop is running.

use pip_core::Pose;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Show or hide the whole scene container
    SetSceneVisible(bool),
    /// Move the reticle marker; `None` hides it
    SetReticle(Option<Pose>),
    /// Start loading the model asset
    LoadModel { url: String },
    /// Anchor the model
    PlaceModel(Pose),
    SetModelVisible(bool),
}

pub trait SceneRenderer: Send + Sync + fmt::Debug {
    /// Whether the render loop has started
    fn render_started(&self) -> bool;

    fn apply(&self, command: RenderCommand);
}
