//! Continuous barcode scanner
//!
//! Owns the camera stream and a background decode loop. The loop samples
//! the latest frame at a fixed frequency, keeps the single best detection
//! and publishes it as [`ScannerEvent::Scanned`]. No debouncing happens
//! here; reacting sensibly to repeated scans is the consumer's job.
//!
//! Stopping only halts the loop. Overlay content and visibility survive, so
//! returning from an AR session is a cheap `start()`.

use crate::camera::{Camera, FrameSource};
use crate::config::ScannerConfig;
use crate::decoder::{best_detection, BarcodeDecoder};
use crate::error::ScannerError;
use crate::symbology::Symbology;
use parking_lot::Mutex;
use pip_core::{EventBus, EventStream, Overlay, ScanResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Events published by the scanner
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerEvent {
    /// Decode loop is running
    Started,
    /// A barcode was decoded
    Scanned(ScanResult),
    /// Decode loop halted by `stop()`
    Stopped,
    /// Initialization or capture failed; the scanner is defunct
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Running,
    /// Failed; only a fresh `start()` revives it
    Defunct,
}

/// Snapshot of decode loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub frames_processed: u64,
    pub decodes_emitted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    frames: AtomicU64,
    decodes: AtomicU64,
}

/// Closes the device however the decode loop ends, including abort
struct OpenSource(Box<dyn FrameSource>);

impl Drop for OpenSource {
    fn drop(&mut self) {
        self.0.close();
    }
}

#[derive(Debug)]
pub struct BarcodeScanner {
    config: ScannerConfig,
    camera: Arc<dyn Camera>,
    decoder: Arc<dyn BarcodeDecoder>,
    events: EventBus<ScannerEvent>,
    state: Arc<Mutex<ScannerState>>,
    counters: Arc<Counters>,
    task: Option<JoinHandle<()>>,
    overlay: Overlay,
    visible: bool,
}

impl BarcodeScanner {
    #[must_use]
    pub fn new(
        config: ScannerConfig,
        camera: Arc<dyn Camera>,
        decoder: Arc<dyn BarcodeDecoder>,
    ) -> Self {
        Self {
            config,
            camera,
            decoder,
            events: EventBus::default(),
            state: Arc::new(Mutex::new(ScannerState::Idle)),
            counters: Arc::new(Counters::default()),
            task: None,
            overlay: Overlay::new(),
            visible: false,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> EventStream<ScannerEvent> {
        self.events.subscribe()
    }

    /// (Re)initialize the pipeline and start decoding
    ///
    /// Any failure is also published as [`ScannerEvent::Error`] and leaves
    /// the scanner defunct.
    ///
    /// # Errors
    /// Returns the configuration, decoder or camera error that stopped
    /// initialization.
    pub async fn start(&mut self) -> Result<(), ScannerError> {
        self.halt_loop();

        let source = match self.open().await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("scanner failed to start: {}", e);
                *self.state.lock() = ScannerState::Defunct;
                self.events.emit(ScannerEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        *self.state.lock() = ScannerState::Running;
        self.task = Some(tokio::spawn(decode_loop(
            OpenSource(source),
            Arc::clone(&self.decoder),
            self.config.symbologies.clone(),
            self.config.decode_interval(),
            self.events.clone(),
            Arc::clone(&self.state),
            Arc::clone(&self.counters),
        )));

        tracing::info!(
            "scanner started at {}x{}, {} Hz",
            self.config.width,
            self.config.height,
            self.config.frequency_hz
        );
        self.events.emit(ScannerEvent::Started);
        Ok(())
    }

    async fn open(&self) -> Result<Box<dyn FrameSource>, ScannerError> {
        self.config.validate()?;
        self.decoder.init(&self.config.symbologies).await?;
        self.camera.open(self.config.constraints()).await
    }

    /// Halt the decode loop, keeping overlay and visibility
    pub fn stop(&mut self) {
        let was_running = self.halt_loop();
        let mut state = self.state.lock();
        if *state == ScannerState::Running {
            *state = ScannerState::Idle;
        }
        drop(state);

        if was_running {
            tracing::info!("scanner stopped");
            self.events.emit(ScannerEvent::Stopped);
        }
    }

    fn halt_loop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ScannerState {
        *self.state.lock()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == ScannerState::Running
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Attachment point for caller-supplied texts and buttons
    #[inline]
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[inline]
    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> ScanStats {
        ScanStats {
            frames_processed: self.counters.frames.load(Ordering::Relaxed),
            decodes_emitted: self.counters.decodes.load(Ordering::Relaxed),
        }
    }
}

impl Drop for BarcodeScanner {
    fn drop(&mut self) {
        self.halt_loop();
    }
}

async fn decode_loop(
    mut source: OpenSource,
    decoder: Arc<dyn BarcodeDecoder>,
    symbologies: Vec<Symbology>,
    interval: Duration,
    events: EventBus<ScannerEvent>,
    state: Arc<Mutex<ScannerState>>,
    counters: Arc<Counters>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let frame = match source.0.grab() {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("camera lost: {}", e);
                *state.lock() = ScannerState::Defunct;
                events.emit(ScannerEvent::Error(e.to_string()));
                return;
            }
        };
        counters.frames.fetch_add(1, Ordering::Relaxed);

        if let Some(detection) = best_detection(decoder.decode(&frame, &symbologies), &symbologies)
        {
            tracing::trace!(
                "decoded {} ({}, confidence {:.2})",
                detection.code,
                detection.symbology,
                detection.confidence
            );
            counters.decodes.fetch_add(1, Ordering::Relaxed);
            events.emit(ScannerEvent::Scanned(ScanResult::new(detection.code)));
        }
    }
}
