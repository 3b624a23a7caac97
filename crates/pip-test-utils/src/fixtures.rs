//! Shared fixtures
//!
//! The reference catalog holds one product, Widget, under the UPC-A code
//! `012345678905` with model reference `m1`.

use crate::backend::{InMemoryProductsApi, InstantLoader};
use crate::capture::{EchoDecoder, FakeCamera};
use crate::render::RecordingRenderer;
use crate::xr::FakeXrPlatform;
use pip_core::{AppTexts, ModelReference, Product};
use pip_representation::{
    Collaborators, DependencyLoader, PipConfig, Representation, RepresentationError,
};
use pip_scene::UrlModelStorage;
use std::sync::Arc;

pub const WIDGET_BARCODE: &str = "012345678905";

/// A valid EAN-13 that is not in the catalog
#[must_use]
pub fn unknown_barcode() -> &'static str {
    "4006381333931"
}

#[must_use]
pub fn widget() -> Product {
    Product::new(WIDGET_BARCODE, "Widget", ModelReference::new("m1").unwrap())
}

/// Texts with every field filled except the viewing button
#[must_use]
pub fn fixture_texts() -> AppTexts {
    AppTexts {
        scanning_title: Some("Scan a product".into()),
        scanning_description: Some("Point the camera at a barcode".into()),
        scanning_button: Some("Show in AR".into()),
        placing_title: Some("Find a surface".into()),
        placing_description: Some("Move your phone slowly".into()),
        placing_button: Some("Place here".into()),
        viewing_title: Some("Looking good".into()),
        viewing_description: Some("Walk around the product".into()),
        viewing_button: None,
        exit_button: Some("Close".into()),
    }
}

/// Every fake needed to bring up a [`Representation`]
#[derive(Debug, Clone)]
pub struct Harness {
    pub api: Arc<InMemoryProductsApi>,
    pub platform: Arc<FakeXrPlatform>,
    pub camera: Arc<FakeCamera>,
    pub decoder: Arc<EchoDecoder>,
    pub renderer: Arc<RecordingRenderer>,
    pub storage: Arc<UrlModelStorage>,
    pub loaders: Vec<Arc<InstantLoader>>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Widget catalog, AR-capable platform, rendering already started
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(FakeXrPlatform::new())
    }

    #[must_use]
    pub fn with_platform(platform: FakeXrPlatform) -> Self {
        Self {
            api: Arc::new(InMemoryProductsApi::new(vec![widget()], fixture_texts())),
            platform: Arc::new(platform),
            camera: Arc::new(FakeCamera::new()),
            decoder: Arc::new(EchoDecoder::new()),
            renderer: Arc::new(RecordingRenderer::new()),
            storage: Arc::new(UrlModelStorage::new("https://storage.test")),
            loaders: vec![
                Arc::new(InstantLoader::new("decoder-runtime")),
                Arc::new(InstantLoader::new("render-runtime")),
            ],
        }
    }

    /// Configuration with the default 500 ms debounce
    #[must_use]
    pub fn config() -> PipConfig {
        PipConfig::default().with_app_id("test-app")
    }

    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            api: self.api.clone(),
            platform: self.platform.clone(),
            camera: self.camera.clone(),
            decoder: self.decoder.clone(),
            renderer: self.renderer.clone(),
            storage: self.storage.clone(),
            loaders: self
                .loaders
                .iter()
                .map(|l| Arc::clone(l) as Arc<dyn DependencyLoader>)
                .collect(),
        }
    }

    /// Load without starting
    ///
    /// # Errors
    /// Propagates startup failures.
    pub async fn load(&self) -> Result<Representation, RepresentationError> {
        Representation::load(Self::config(), self.collaborators()).await
    }

    /// Forward every queued platform signal
    pub async fn pump_signals(&self, representation: &mut Representation) {
        loop {
            let signals = self.platform.take_signals();
            if signals.is_empty() {
                break;
            }
            for signal in signals {
                representation.handle_signal(signal).await;
            }
        }
    }
}
