//! Application configuration
//!
//! One TOML document configures the whole flow:
//!
//! ```toml
//! app_id = "demo"
//! api_base_url = "https://pip.example/api"
//! storage_base_url = "https://pip.example/storage"
//! debounce_ms = 500
//!
//! [scanner]
//! width = 1280
//! height = 720
//! symbologies = ["ean-13", "upc-a"]
//!
//! [hit_test]
//! source = "transient"
//! profile = "generic-touchscreen"
//!
//! [messages]
//! camera_error = "Error: could not access camera"
//! ```

use crate::error::ConfigError;
use pip_scanner::ScannerConfig;
use pip_scene::{ArSceneConfig, UrlModelStorage};
use pip_xr::{HitTestOptions, ReferenceSpaceKind, SessionFeatures};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CAMERA_ERROR: &str = "Error: could not access camera";

/// Where hit-test rays come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum HitTestMode {
    /// Straight ahead from the viewer
    #[default]
    Viewer,
    /// From screen touches
    Transient { profile: String },
}

impl HitTestMode {
    #[must_use]
    pub fn options(&self) -> HitTestOptions {
        match self {
            Self::Viewer => HitTestOptions::Space(ReferenceSpaceKind::Viewer),
            Self::Transient { profile } => HitTestOptions::Transient {
                profile: profile.clone(),
            },
        }
    }
}

/// User-facing messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Shown for every scanner failure
    pub camera_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            camera_error: DEFAULT_CAMERA_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipConfig {
    pub app_id: String,
    /// Products API root
    pub api_base_url: String,
    /// Model storage root
    pub storage_base_url: String,
    /// Window for select, proceed and stop
    pub debounce_ms: u64,
    pub scanner: ScannerConfig,
    pub hit_test: HitTestMode,
    pub messages: Messages,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            app_id: "demo".to_string(),
            api_base_url: "http://localhost:8080/api".to_string(),
            storage_base_url: "http://localhost:8080/storage".to_string(),
            debounce_ms: 500,
            scanner: ScannerConfig::default(),
            hit_test: HitTestMode::default(),
            messages: Messages::default(),
        }
    }
}

impl PipConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for values that fail validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`PipConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_storage_base_url(mut self, url: impl Into<String>) -> Self {
        self.storage_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn with_scanner(mut self, scanner: ScannerConfig) -> Self {
        self.scanner = scanner;
        self
    }

    #[must_use]
    pub fn with_hit_test(mut self, hit_test: HitTestMode) -> Self {
        self.hit_test = hit_test;
        self
    }

    /// Check values that would only fail later at runtime
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("app_id is empty".into()));
        }
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("storage_base_url", &self.storage_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce_ms must be non-zero".into()));
        }
        if let HitTestMode::Transient { profile } = &self.hit_test {
            if profile.trim().is_empty() {
                return Err(ConfigError::Invalid("transient hit test needs a profile".into()));
            }
        }
        self.scanner
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn scene_config(&self) -> ArSceneConfig {
        ArSceneConfig {
            debounce: self.debounce(),
            hit_test: self.hit_test.options(),
            features: SessionFeatures::placement(),
        }
    }

    #[must_use]
    pub fn model_storage(&self) -> UrlModelStorage {
        UrlModelStorage::new(self.storage_base_url.clone())
    }
}
