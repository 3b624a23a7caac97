//! Overlay model
//!
//! The 2D surface shown next to or instead of the 3D scene. Components own
//! an [`Overlay`] and hand it to callers, who add their own texts and
//! buttons by key. Rendering the model is left to the view layer.

use crate::texts::ModeTexts;
use indexmap::IndexMap;

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const PRIMARY_BUTTON: &str = "primary";

/// A labeled control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayButton {
    pub label: String,
    pub enabled: bool,
}

/// Keyed overlay content in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    texts: IndexMap<String, String>,
    buttons: IndexMap<String, OverlayButton>,
    revision: u64,
}

impl Overlay {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or add) a text element
    pub fn set_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(key.into(), text.into());
        self.bump();
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Set (or add) a button, keeping its enabled flag if it exists
    pub fn set_button(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let label = label.into();
        self.buttons
            .entry(key.into())
            .and_modify(|b| b.label.clone_from(&label))
            .or_insert(OverlayButton {
                label,
                enabled: true,
            });
        self.bump();
    }

    /// Enable or disable an existing button; unknown keys are ignored
    pub fn set_button_enabled(&mut self, key: &str, enabled: bool) {
        if let Some(button) = self.buttons.get_mut(key) {
            if button.enabled != enabled {
                button.enabled = enabled;
                self.bump();
            }
        }
    }

    #[must_use]
    pub fn button(&self, key: &str) -> Option<&OverlayButton> {
        self.buttons.get(key)
    }

    /// Replace title, description and primary button with one mode's copy
    pub fn apply_mode(&mut self, texts: &ModeTexts) {
        self.set_text(TITLE, texts.title.clone());
        self.set_text(DESCRIPTION, texts.description.clone());
        self.set_button(PRIMARY_BUTTON, texts.button.clone());
    }

    /// Text keys in display order
    pub fn text_keys(&self) -> impl Iterator<Item = &str> {
        self.texts.keys().map(String::as_str)
    }

    /// Number of mutations so far; lets views skip redundant redraws
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
