//! Barcode scanning for Product in Perspective
//!
//! A [`BarcodeScanner`] reads a live camera feed, decodes retail barcodes
//! at a fixed low frequency and publishes one [`ScannerEvent::Scanned`] per
//! successful decode. It knows nothing about AR.
//!
//! # Example
//!
//! ```rust,ignore
//! use pip_scanner::{BarcodeScanner, ScannerConfig, ScannerEvent};
//!
//! let mut scanner = BarcodeScanner::new(ScannerConfig::default(), camera, decoder);
//! let mut events = scanner.subscribe();
//! scanner.start().await?;
//!
//! while let Some(ScannerEvent::Scanned(result)) = events.next().await {
//!     println!("scanned {}", result.code);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod camera;
pub mod config;
pub mod decoder;
pub mod error;
pub mod scanner;
pub mod symbology;

pub use camera::{Camera, Facing, Frame, FrameSource, VideoConstraints};
pub use config::ScannerConfig;
pub use decoder::{best_detection, BarcodeDecoder, Detection};
pub use error::ScannerError;
pub use scanner::{BarcodeScanner, ScanStats, ScannerEvent, ScannerState};
pub use symbology::Symbology;
