//! AR scene configuration

use pip_core::DEFAULT_DEBOUNCE;
use pip_xr::{HitTestOptions, SessionFeatures};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArSceneConfig {
    /// Window for the proceed and stop controls
    pub debounce: Duration,
    pub hit_test: HitTestOptions,
    pub features: SessionFeatures,
}

impl ArSceneConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_hit_test(mut self, hit_test: HitTestOptions) -> Self {
        self.hit_test = hit_test;
        self
    }
}

impl Default for ArSceneConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            hit_test: HitTestOptions::default(),
            features: SessionFeatures::placement(),
        }
    }
}
