//! XR layer for Product in Perspective
//!
//! - [`platform`]: capability interface onto the AR/XR runtime
//! - [`hit_test`]: fail-closed per-frame surface detection
//! - [`reticle`]: the surface marker driven by hit testing
//!
//! # Example
//!
//! ```rust,ignore
//! use pip_xr::{HitTest, HitTestOptions, Reticle};
//!
//! let mut reticle = Reticle::new(HitTest::new(HitTestOptions::default()));
//! reticle.hit_test().session_started(session.clone()).await?;
//! reticle.show();
//!
//! // once per render frame
//! reticle.tick(&frame);
//! let anchor = reticle.pose();
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod platform;
pub mod reticle;

pub use error::XrError;
pub use hit_test::{HitTest, HitTestOptions, HitTestResult, InputSpace};
pub use platform::{
    HitTestSource, HitTestSourceRequest, InputSourceId, ReferenceSpace, ReferenceSpaceKind,
    SessionFeatures, SessionId, SessionMode, TransientHitResults, XrFrame, XrPlatform, XrSession,
    XrSignal,
};
pub use reticle::{Reticle, ReticleEvent, ReticleUpdate};
