//! Product in Perspective orchestrator
//!
//! Wires the barcode scanner and the AR scene into the scan, select, place
//! and view flow:
//! - [`catalog`]: products API client and the barcode lookup
//! - [`loader`]: startup preconditions joined before anything runs
//! - [`config`]: TOML configuration for the whole flow
//! - [`representation`]: the orchestrator and its run loop
//!
//! # Example
//!
//! ```rust,ignore
//! use pip_representation::{Collaborators, Control, PipConfig, Representation};
//!
//! let config = PipConfig::load("pip.toml")?;
//! let mut representation = Representation::load(config, collaborators).await?;
//! let mut events = representation.subscribe();
//! representation.start().await;
//!
//! let (controls, mut rx) = tokio::sync::mpsc::channel(64);
//! representation.run(&mut rx).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod representation;

pub use catalog::{HttpProductsApi, ProductCatalog, ProductsApi};
pub use config::{HitTestMode, Messages, PipConfig, DEFAULT_CAMERA_ERROR};
pub use error::{CatalogError, ConfigError, LoadError, RepresentationError};
pub use loader::{await_preconditions, DependencyLoader, Preconditions};
pub use representation::{
    Collaborators, Control, Representation, RepresentationEvent, Surface, CANDIDATE_TEXT,
    SELECT_BUTTON,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the flow
    pub use crate::{
        Collaborators, Control, PipConfig, Representation, RepresentationError,
        RepresentationEvent, Surface,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
