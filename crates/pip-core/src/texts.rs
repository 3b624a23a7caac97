//! Per-app display texts
//!
//! The products API delivers one flat bundle per app. Components read the
//! slice for their current mode through [`AppTexts::for_mode`], which fills
//! in fallbacks so no control is ever left unlabeled.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SCANNING_BUTTON: &str = "Select";
pub const DEFAULT_PLACING_BUTTON: &str = "Place";
pub const DEFAULT_VIEWING_BUTTON: &str = "Proceed";
pub const DEFAULT_EXIT_BUTTON: &str = "Exit";

/// Which copy a surface is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    Scanning,
    Placing,
    Viewing,
}

/// Text bundle for one app, as delivered by the products API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AppTexts {
    pub scanning_title: Option<String>,
    pub scanning_description: Option<String>,
    pub scanning_button: Option<String>,
    pub placing_title: Option<String>,
    pub placing_description: Option<String>,
    pub placing_button: Option<String>,
    pub viewing_title: Option<String>,
    pub viewing_description: Option<String>,
    pub viewing_button: Option<String>,
    pub exit_button: Option<String>,
}

/// Resolved copy for one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTexts {
    pub title: String,
    pub description: String,
    pub button: String,
}

impl AppTexts {
    /// Resolve the copy for `mode`, applying fallbacks
    #[must_use]
    pub fn for_mode(&self, mode: TextMode) -> ModeTexts {
        let (title, description, button, default_button) = match mode {
            TextMode::Scanning => (
                &self.scanning_title,
                &self.scanning_description,
                &self.scanning_button,
                DEFAULT_SCANNING_BUTTON,
            ),
            TextMode::Placing => (
                &self.placing_title,
                &self.placing_description,
                &self.placing_button,
                DEFAULT_PLACING_BUTTON,
            ),
            TextMode::Viewing => (
                &self.viewing_title,
                &self.viewing_description,
                &self.viewing_button,
                DEFAULT_VIEWING_BUTTON,
            ),
        };

        ModeTexts {
            title: title.clone().unwrap_or_default(),
            description: description.clone().unwrap_or_default(),
            button: non_blank(button).unwrap_or(default_button).to_string(),
        }
    }

    /// Label for the exit control
    #[must_use]
    pub fn exit_label(&self) -> String {
        non_blank(&self.exit_button)
            .unwrap_or(DEFAULT_EXIT_BUTTON)
            .to_string()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
