//! Top-level orchestrator
//!
//! [`Representation`] couples the barcode scanner and the AR scene into one
//! flow: scan a product, select it, place its model, view it, return to
//! scanning. It owns both components and the barcode lookup and is the only
//! place that reacts to their events.
//!
//! After `start()` exactly one surface is visible at any time: the scanner
//! while looking for products, the scene during an AR attempt.
//!
//! The orchestrator can be driven two ways. Calling its methods directly
//! handles every component event that is already buffered before returning.
//! [`Representation::run`] drives it from a control channel and also wakes
//! up for events arriving in between, such as background scans.

use crate::catalog::{ProductCatalog, ProductsApi};
use crate::config::PipConfig;
use crate::error::RepresentationError;
use crate::loader::{await_preconditions, DependencyLoader};
use pip_core::overlay::{DESCRIPTION, PRIMARY_BUTTON, TITLE};
use pip_core::{AppTexts, Debouncer, EventBus, EventStream, Product, ScanResult, TextMode};
use pip_scanner::{BarcodeDecoder, BarcodeScanner, Camera, ScannerEvent};
use pip_scene::{ArScene, ModelStorage, SceneError, SceneEvent, SceneMode, SceneRenderer};
use pip_xr::{XrFrame, XrPlatform, XrSignal};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Scanner overlay key announcing the candidate product
pub const CANDIDATE_TEXT: &str = "candidate";

/// Scanner overlay key of the select control
pub const SELECT_BUTTON: &str = PRIMARY_BUTTON;

/// The two surfaces the user can see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Scanner,
    Scene,
}

/// Events published to the embedding application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RepresentationEvent {
    /// Scanner is up and visible
    Ready,
    /// A new product was recognized
    CandidateChanged(Product),
    /// The scene mode moved
    SceneModeChanged(SceneMode),
    /// The visible surface switched
    SurfaceChanged(Surface),
    /// User-facing failure message
    Error(String),
}

/// Inputs accepted by [`Representation::run`]
pub enum Control {
    Select,
    Proceed,
    Stop,
    Signal(XrSignal),
    Frame(Arc<dyn XrFrame>),
    Shutdown,
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => f.write_str("Select"),
            Self::Proceed => f.write_str("Proceed"),
            Self::Stop => f.write_str("Stop"),
            Self::Signal(signal) => f.debug_tuple("Signal").field(signal).finish(),
            Self::Frame(frame) => f.debug_tuple("Frame").field(&frame.session_id()).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Everything the orchestrator talks to
#[derive(Clone)]
pub struct Collaborators {
    pub api: Arc<dyn ProductsApi>,
    pub platform: Arc<dyn XrPlatform>,
    pub camera: Arc<dyn Camera>,
    pub decoder: Arc<dyn BarcodeDecoder>,
    pub renderer: Arc<dyn SceneRenderer>,
    pub storage: Arc<dyn ModelStorage>,
    pub loaders: Vec<Arc<dyn DependencyLoader>>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("platform", &self.platform)
            .field("camera", &self.camera)
            .field("decoder", &self.decoder)
            .field("renderer", &self.renderer)
            .field("storage", &self.storage)
            .field("loaders", &self.loaders.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Representation {
    config: PipConfig,
    catalog: ProductCatalog,
    texts: AppTexts,
    scanner: BarcodeScanner,
    scene: ArScene,
    scanner_events: EventStream<ScannerEvent>,
    scene_events: EventStream<SceneEvent>,
    candidate: Option<Product>,
    select_debounce: Debouncer,
    events: EventBus<RepresentationEvent>,
}

impl Representation {
    /// Wait for every precondition, then build scanner and scene
    ///
    /// Nothing is started yet; subscribe, then call [`Representation::start`].
    ///
    /// # Errors
    /// Returns the configuration, catalog or dependency failure that
    /// prevented startup.
    pub async fn load(
        config: PipConfig,
        collaborators: Collaborators,
    ) -> Result<Self, RepresentationError> {
        config.validate()?;

        let ready = match await_preconditions(
            collaborators.api.as_ref(),
            &config.app_id,
            &collaborators.loaders,
        )
        .await
        {
            Ok(ready) => ready,
            Err(e) => {
                tracing::error!("startup failed: {}", e);
                return Err(e);
            }
        };

        let mut scanner = BarcodeScanner::new(
            config.scanner.clone(),
            collaborators.camera,
            collaborators.decoder,
        );
        let scanning = ready.texts.for_mode(TextMode::Scanning);
        let overlay = scanner.overlay_mut();
        overlay.set_text(TITLE, scanning.title);
        overlay.set_text(DESCRIPTION, scanning.description);
        overlay.set_text(CANDIDATE_TEXT, "");
        overlay.set_button(SELECT_BUTTON, scanning.button);
        overlay.set_button_enabled(SELECT_BUTTON, false);

        let scene = ArScene::new(
            config.scene_config(),
            collaborators.platform,
            collaborators.renderer,
            collaborators.storage,
            ready.texts.clone(),
        );

        Ok(Self {
            scanner_events: scanner.subscribe(),
            scene_events: scene.subscribe(),
            select_debounce: Debouncer::new(config.debounce()),
            config,
            catalog: ready.catalog,
            texts: ready.texts,
            scanner,
            scene,
            candidate: None,
            events: EventBus::default(),
        })
    }

    #[must_use]
    pub fn subscribe(&self) -> EventStream<RepresentationEvent> {
        self.events.subscribe()
    }

    /// Start scanning
    ///
    /// A camera failure is reported as [`RepresentationEvent::Error`]; the
    /// scanner surface is shown either way.
    pub async fn start(&mut self) {
        if let Err(e) = self.scanner.start().await {
            tracing::debug!("scanner start failed: {}", e);
        }
        self.scanner.show();
        tracing::info!("representation ready with {} products", self.catalog.len());
        self.events.emit(RepresentationEvent::Ready);
        self.process_pending_events().await;
    }

    /// User pressed the select control
    ///
    /// Returns whether an AR attempt was started. Ignored inside the
    /// debounce window, without a candidate, or before the scene can render.
    pub async fn select(&mut self) -> bool {
        if !self.select_debounce.trigger() {
            tracing::trace!("select debounced");
            return false;
        }
        if !self.scene.active() {
            tracing::debug!("select ignored, scene not rendering yet");
            return false;
        }
        let Some(product) = self.candidate.take() else {
            tracing::debug!("select ignored, no candidate");
            return false;
        };

        tracing::info!("selected {}", product.name);
        self.scanner.stop();
        self.scanner.hide();
        let overlay = self.scanner.overlay_mut();
        overlay.set_text(CANDIDATE_TEXT, "");
        overlay.set_button_enabled(SELECT_BUTTON, false);

        let started = match self.scene.select(product).await {
            Ok(()) => {
                self.events
                    .emit(RepresentationEvent::SurfaceChanged(Surface::Scene));
                true
            }
            Err(e) => {
                // Platform refusals were already published by the scene
                if !matches!(e, SceneError::SessionRequest(_)) {
                    self.events.emit(RepresentationEvent::Error(e.to_string()));
                }
                self.return_to_scanner().await;
                false
            }
        };
        self.process_pending_events().await;
        started
    }

    /// User pressed the scene's primary control
    pub async fn proceed(&mut self) -> bool {
        let changed = self.scene.proceed().await;
        self.process_pending_events().await;
        changed
    }

    /// User pressed the scene's exit control
    pub async fn stop(&mut self) -> bool {
        let stopped = self.scene.stop().await;
        self.process_pending_events().await;
        stopped
    }

    /// Forward a platform lifecycle signal
    pub async fn handle_signal(&mut self, signal: XrSignal) {
        self.scene.handle_signal(signal).await;
        self.process_pending_events().await;
    }

    /// Forward one render frame
    pub fn on_frame(&mut self, frame: &dyn XrFrame) {
        self.scene.on_frame(frame);
    }

    /// Handle every component event buffered so far
    pub async fn process_pending_events(&mut self) {
        loop {
            if let Some(event) = self.scanner_events.try_next() {
                self.handle_scanner_event(event).await;
            } else if let Some(event) = self.scene_events.try_next() {
                self.handle_scene_event(event).await;
            } else {
                break;
            }
        }
    }

    /// Drive the orchestrator until shutdown
    ///
    /// Stops when [`Control::Shutdown`] arrives or every sender is dropped.
    /// The scanner is halted on the way out.
    pub async fn run(&mut self, controls: &mut mpsc::Receiver<Control>) {
        tracing::info!("representation loop started");
        loop {
            tokio::select! {
                control = controls.recv() => match control {
                    Some(Control::Shutdown) | None => break,
                    Some(control) => self.handle_control(control).await,
                },
                Some(event) = self.scanner_events.next() => {
                    self.handle_scanner_event(event).await;
                }
                Some(event) = self.scene_events.next() => {
                    self.handle_scene_event(event).await;
                }
            }
        }
        self.scanner.stop();
        tracing::info!("representation loop stopped");
    }

    async fn handle_control(&mut self, control: Control) {
        tracing::trace!("control {:?}", control);
        match control {
            Control::Select => {
                self.select().await;
            }
            Control::Proceed => {
                self.proceed().await;
            }
            Control::Stop => {
                self.stop().await;
            }
            Control::Signal(signal) => self.handle_signal(signal).await,
            Control::Frame(frame) => self.on_frame(frame.as_ref()),
            Control::Shutdown => {}
        }
    }

    async fn handle_scanner_event(&mut self, event: ScannerEvent) {
        match event {
            ScannerEvent::Scanned(result) => self.handle_scanned(&result),
            ScannerEvent::Error(detail) => {
                tracing::warn!("scanner failed: {}", detail);
                self.events.emit(RepresentationEvent::Error(
                    self.config.messages.camera_error.clone(),
                ));
            }
            ScannerEvent::Started | ScannerEvent::Stopped => {
                tracing::debug!("scanner {:?}", event);
            }
        }
    }

    fn handle_scanned(&mut self, result: &ScanResult) {
        if !self.scanner.is_running() {
            tracing::trace!("dropping stale scan {}", result.code);
            return;
        }
        let Some(product) = self.catalog.lookup(&result.code) else {
            tracing::trace!("ignoring unknown barcode {}", result.code);
            return;
        };
        if self
            .candidate
            .as_ref()
            .is_some_and(|c| c.barcode_key() == product.barcode_key())
        {
            return;
        }

        let product = product.clone();
        let selectable = self.scene.active();
        tracing::debug!("candidate {} (selectable: {})", product.name, selectable);

        let overlay = self.scanner.overlay_mut();
        overlay.set_text(CANDIDATE_TEXT, "");
        overlay.set_text(CANDIDATE_TEXT, product.name.clone());
        overlay.set_button_enabled(SELECT_BUTTON, selectable);

        self.candidate = Some(product.clone());
        self.events
            .emit(RepresentationEvent::CandidateChanged(product));
    }

    async fn handle_scene_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::ModeChanged(mode) => {
                self.events
                    .emit(RepresentationEvent::SceneModeChanged(mode));
            }
            SceneEvent::End => {
                tracing::info!("AR session ended");
                self.return_to_scanner().await;
            }
            SceneEvent::Error(message) => {
                self.events.emit(RepresentationEvent::Error(message));
                if self.scene.is_visible() && !self.scene.mode().is_active() {
                    self.return_to_scanner().await;
                }
            }
        }
    }

    async fn return_to_scanner(&mut self) {
        if !self.scene.is_visible() && self.scanner.is_visible() {
            return;
        }
        self.scene.hide();
        let stale = self.scanner_events.drain();
        if !stale.is_empty() {
            tracing::trace!("dropping {} scanner events from the previous run", stale.len());
        }
        if let Err(e) = self.scanner.start().await {
            tracing::debug!("scanner restart failed: {}", e);
        }
        self.scanner.show();
        self.events
            .emit(RepresentationEvent::SurfaceChanged(Surface::Scanner));
    }

    /// Surfaces currently shown
    #[must_use]
    pub fn visible_surfaces(&self) -> Vec<Surface> {
        let mut surfaces = Vec::with_capacity(2);
        if self.scanner.is_visible() {
            surfaces.push(Surface::Scanner);
        }
        if self.scene.is_visible() {
            surfaces.push(Surface::Scene);
        }
        surfaces
    }

    #[inline]
    #[must_use]
    pub fn candidate(&self) -> Option<&Product> {
        self.candidate.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn texts(&self) -> &AppTexts {
        &self.texts
    }

    #[inline]
    #[must_use]
    pub fn scanner(&self) -> &BarcodeScanner {
        &self.scanner
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &ArScene {
        &self.scene
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipConfig {
        &self.config
    }
}
