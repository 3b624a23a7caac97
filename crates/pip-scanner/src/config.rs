//! Scanner configuration

use crate::camera::{Facing, VideoConstraints};
use crate::error::ScannerError;
use crate::symbology::Symbology;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decoding pipeline settings
///
/// Multiple-barcode detection is always off and is not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Preferred capture width
    pub width: u32,
    /// Preferred capture height
    pub height: u32,
    pub facing: Facing,
    pub symbologies: Vec<Symbology>,
    /// Decode attempts per second
    pub frequency_hz: u32,
}

impl ScannerConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_symbologies(mut self, symbologies: Vec<Symbology>) -> Self {
        self.symbologies = symbologies;
        self
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency_hz: u32) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Check the settings before the scanner uses them
    ///
    /// # Errors
    /// Returns `ScannerError::Config` for zero sizes, zero frequency or an
    /// empty symbology list.
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.width == 0 || self.height == 0 {
            return Err(ScannerError::Config("resolution must be non-zero".into()));
        }
        if self.frequency_hz == 0 {
            return Err(ScannerError::Config("frequency must be non-zero".into()));
        }
        if self.symbologies.is_empty() {
            return Err(ScannerError::Config("no symbologies enabled".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn constraints(&self) -> VideoConstraints {
        VideoConstraints {
            width: self.width,
            height: self.height,
            facing: self.facing,
        }
    }

    /// Time between decode attempts
    #[must_use]
    pub fn decode_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frequency_hz.max(1)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            facing: Facing::Environment,
            symbologies: Symbology::RETAIL.to_vec(),
            frequency_hz: 10,
        }
    }
}
