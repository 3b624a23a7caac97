//! Model storage resolution
//!
//! Turns a product's model reference into a URL the renderer can load.

use pip_core::ModelReference;
use std::fmt;

pub trait ModelStorage: Send + Sync + fmt::Debug {
    fn model_url(&self, reference: &ModelReference) -> String;
}

/// Storage service serving models at `{base}/models/{reference}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlModelStorage {
    base_url: String,
}

impl UrlModelStorage {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ModelStorage for UrlModelStorage {
    fn model_url(&self, reference: &ModelReference) -> String {
        format!("{}/models/{}", self.base_url, reference)
    }
}
