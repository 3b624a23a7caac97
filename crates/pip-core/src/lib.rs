//! Product in Perspective - shared core
//!
//! Building blocks used by every component of the AR preview flow:
//! - Product, barcode and pose types
//! - Typed per-component event buses
//! - Leading-edge debouncing for UI triggers
//! - Per-mode text bundles with label fallbacks
//! - The overlay model components expose to their callers
//!
//! # Example
//!
//! ```rust,ignore
//! use pip_core::{Debouncer, EventBus, ScanResult};
//!
//! let bus: EventBus<ScanResult> = EventBus::new(16);
//! let mut events = bus.subscribe();
//! bus.emit(ScanResult::from("012345678905"));
//!
//! let mut select = Debouncer::default();
//! assert!(select.trigger());
//! assert!(!select.trigger());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod debounce;
pub mod error;
pub mod events;
pub mod overlay;
pub mod texts;
pub mod types;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use error::CoreError;
pub use events::{EventBus, EventStream};
pub use overlay::{Overlay, OverlayButton};
pub use texts::{AppTexts, ModeTexts, TextMode};
pub use types::{BarcodeValue, ModelReference, Pose, Product, Quat, ScanResult, Vec3};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the shared core
    pub use crate::{
        AppTexts, BarcodeValue, Debouncer, EventBus, EventStream, ModeTexts, ModelReference,
        Overlay, Pose, Product, ScanResult, TextMode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
