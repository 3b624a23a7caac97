//! Scene state machine
//!
//! The scene mode only changes through [`transition`], a pure function of
//! the current mode and one input. It returns the next mode and the side
//! effects to carry out, leaving the renderer and overlay bindings to the
//! caller.
//!
//! ```text
//!             Entered(AR)            Proceed(anchor)
//! Inactive ──────────────► Placing ◄──────────────► Viewing
//!    ▲                        │        Proceed         │
//!    └──────── End ───────────┴────────────────────────┘
//! ```

use crate::error::{COULD_NOT_ENTER_AR, VR_NOT_IMPLEMENTED};
use pip_core::{Pose, TextMode};
use pip_xr::SessionMode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneMode {
    /// No session entered
    #[default]
    Inactive,
    /// Surface detection running, reticle visible, no model
    Placing,
    /// Model anchored at the committed pose, reticle hidden
    Viewing,
}

impl SceneMode {
    #[inline]
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

impl fmt::Display for SceneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inactive => "inactive",
            Self::Placing => "placing",
            Self::Viewing => "viewing",
        };
        f.write_str(name)
    }
}

/// Inputs the state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneInput {
    /// Platform presentation entered an immersive mode
    Entered(SessionMode),
    /// User pressed proceed; carries the reticle's current hit, if any
    Proceed { anchor: Option<Pose> },
    /// Session is ending (platform exit or user stop)
    End,
}

/// Side effects of a transition, in execution order
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    ShowReticle,
    HideReticle,
    /// Fix the model at this pose
    PlaceModel(Pose),
    ShowModel,
    HideModel,
    /// Swap overlay copy to this mode's texts
    ApplyTexts(TextMode),
    /// End the platform session
    EndSession,
    /// Publish the end event
    EmitEnd,
    /// Publish an error event with this message
    Fail(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: SceneMode,
    pub commands: Vec<SceneCommand>,
}

impl Transition {
    fn to(next: SceneMode, commands: Vec<SceneCommand>) -> Self {
        Self { next, commands }
    }

    fn stay(mode: SceneMode) -> Self {
        Self::to(mode, Vec::new())
    }

    #[inline]
    #[must_use]
    pub fn changes_mode(&self, from: SceneMode) -> bool {
        self.next != from
    }
}

/// Compute the next mode and its side effects
#[must_use]
pub fn transition(mode: SceneMode, input: SceneInput) -> Transition {
    use SceneCommand::{
        ApplyTexts, EmitEnd, EndSession, Fail, HideModel, HideReticle, PlaceModel, ShowModel,
        ShowReticle,
    };
    use SceneMode::{Inactive, Placing, Viewing};

    match (mode, input) {
        (Inactive, SceneInput::Entered(SessionMode::ImmersiveAr)) => Transition::to(
            Placing,
            vec![HideModel, ShowReticle, ApplyTexts(TextMode::Placing)],
        ),
        (Inactive, SceneInput::Entered(SessionMode::ImmersiveVr)) => Transition::to(
            Inactive,
            vec![Fail(VR_NOT_IMPLEMENTED.to_string()), EndSession],
        ),
        (Inactive, SceneInput::Entered(SessionMode::Inline)) => Transition::to(
            Inactive,
            vec![Fail(COULD_NOT_ENTER_AR.to_string()), EndSession],
        ),
        // Repeated enter signals while a session runs change nothing
        (Placing | Viewing, SceneInput::Entered(_)) => Transition::stay(mode),

        (Placing, SceneInput::Proceed { anchor: Some(pose) }) => Transition::to(
            Viewing,
            vec![
                HideReticle,
                PlaceModel(pose),
                ShowModel,
                ApplyTexts(TextMode::Viewing),
            ],
        ),
        (Placing, SceneInput::Proceed { anchor: None }) => Transition::stay(Placing),
        (Viewing, SceneInput::Proceed { .. }) => Transition::to(
            Placing,
            vec![HideModel, ShowReticle, ApplyTexts(TextMode::Placing)],
        ),
        (Inactive, SceneInput::Proceed { .. }) => Transition::stay(Inactive),

        (Placing | Viewing, SceneInput::End) => {
            Transition::to(Inactive, vec![HideReticle, HideModel, EmitEnd])
        }
        (Inactive, SceneInput::End) => Transition::stay(Inactive),
    }
}
