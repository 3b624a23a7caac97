//! Barcode decoder interface
//!
//! Decoders may report several candidate detections per frame. Multiple
//! simultaneous barcodes are not supported: [`best_detection`] filters the
//! candidates to the enabled symbologies, drops payloads that fail their
//! check digit and keeps the single most confident one.

use crate::camera::Frame;
use crate::error::ScannerError;
use crate::symbology::Symbology;
use pip_core::BarcodeValue;
use std::fmt;

/// One decoded candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub code: BarcodeValue,
    pub symbology: Symbology,
    /// Decoder confidence in `0.0..=1.0`
    pub confidence: f32,
}

/// Frame decoder
#[async_trait::async_trait]
pub trait BarcodeDecoder: Send + Sync + fmt::Debug {
    /// Prepare the decoding runtime; called on every scanner start
    async fn init(&self, _symbologies: &[Symbology]) -> Result<(), ScannerError> {
        Ok(())
    }

    /// Decode candidates in one frame
    fn decode(&self, frame: &Frame, symbologies: &[Symbology]) -> Vec<Detection>;
}

/// Pick the single detection to report for a frame
#[must_use]
pub fn best_detection(detections: Vec<Detection>, enabled: &[Symbology]) -> Option<Detection> {
    detections
        .into_iter()
        .filter(|d| enabled.contains(&d.symbology))
        .filter(|d| d.symbology.accepts(&d.code.key()))
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
}
