//! Testing utilities for Product in Perspective
//!
//! Deterministic stand-ins for every outside collaborator:
//! - [`xr`]: scripted XR platform, sessions and frames
//! - [`capture`]: camera fed from a frame queue and a decoder that reads
//!   the barcode straight out of the frame bytes
//! - [`render`]: renderer that records what it was told
//! - [`backend`]: in-memory products API and dependency loaders
//! - [`fixtures`]: the Widget catalog and a [`Harness`] wiring it all up

#![allow(missing_docs)]

pub mod backend;
pub mod capture;
pub mod fixtures;
pub mod render;
pub mod xr;

pub use backend::{InMemoryProductsApi, InstantLoader};
pub use capture::{code_frame, EchoDecoder, FakeCamera};
pub use fixtures::{fixture_texts, unknown_barcode, widget, Harness, WIDGET_BARCODE};
pub use render::RecordingRenderer;
pub use xr::{FakeFrame, FakeSession, FakeXrPlatform};
