//! Recording renderer

use parking_lot::Mutex;
use pip_core::Pose;
use pip_scene::{RenderCommand, SceneRenderer};
use std::sync::atomic::{AtomicBool, Ordering};

/// Renderer that keeps every command it receives
#[derive(Debug)]
pub struct RecordingRenderer {
    started: AtomicBool,
    commands: Mutex<Vec<RenderCommand>>,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    /// Renderer whose loop is already running
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: AtomicBool::new(true),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Renderer still waiting for its first frame
    #[must_use]
    pub fn not_started() -> Self {
        let renderer = Self::new();
        renderer.set_started(false);
        renderer
    }

    pub fn set_started(&self, started: bool) {
        self.started.store(started, Ordering::SeqCst);
    }

    #[must_use]
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.commands.lock().clone()
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    /// URL of the last model load
    #[must_use]
    pub fn loaded_model(&self) -> Option<String> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            RenderCommand::LoadModel { url } => Some(url.clone()),
            _ => None,
        })
    }

    /// Pose of the last model placement
    #[must_use]
    pub fn model_pose(&self) -> Option<Pose> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            RenderCommand::PlaceModel(pose) => Some(*pose),
            _ => None,
        })
    }

    #[must_use]
    pub fn model_visible(&self) -> bool {
        self.last_flag(|c| match c {
            RenderCommand::SetModelVisible(v) => Some(*v),
            _ => None,
        })
    }

    #[must_use]
    pub fn scene_visible(&self) -> bool {
        self.last_flag(|c| match c {
            RenderCommand::SetSceneVisible(v) => Some(*v),
            _ => None,
        })
    }

    /// Where the reticle was last drawn; `None` if hidden
    #[must_use]
    pub fn reticle(&self) -> Option<Pose> {
        self.commands
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                RenderCommand::SetReticle(pose) => Some(*pose),
                _ => None,
            })
            .flatten()
    }

    fn last_flag(&self, pick: impl Fn(&RenderCommand) -> Option<bool>) -> bool {
        self.commands
            .lock()
            .iter()
            .rev()
            .find_map(pick)
            .unwrap_or(false)
    }
}

impl SceneRenderer for RecordingRenderer {
    fn render_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn apply(&self, command: RenderCommand) {
        tracing::trace!("render {:?}", command);
        self.commands.lock().push(command);
    }
}
