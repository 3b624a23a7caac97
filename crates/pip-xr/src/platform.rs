//! XR platform capability interface
//!
//! The runtime is never reached through ambient globals. Callers get an
//! explicit [`XrPlatform`] handle, request an [`XrSession`] from it and hand
//! that session to whichever component needs it.
//!
//! Capabilities mirror the platform calls the core relies on:
//! - `request_session`
//! - `request_reference_space`
//! - `request_hit_test_source`
//! - `viewer_pose` and the hit-test result getters on [`XrFrame`]

use crate::error::XrError;
use pip_core::Pose;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies one session for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xr-session-{}", self.0)
    }
}

/// Identifies one input source (a touch, a controller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputSourceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    ImmersiveAr,
    ImmersiveVr,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpaceKind {
    Viewer,
    Local,
    LocalFloor,
    BoundedFloor,
    Unbounded,
}

/// Optional and required features for a session request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFeatures {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl SessionFeatures {
    /// Features needed for surface placement with a DOM overlay
    #[must_use]
    pub fn placement() -> Self {
        Self {
            required: vec!["hit-test".to_string()],
            optional: vec!["dom-overlay".to_string(), "local-floor".to_string()],
        }
    }
}

/// Handle to a reference space created by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceSpace {
    pub id: u64,
    pub kind: ReferenceSpaceKind,
}

/// What a hit-test source is anchored to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTestSourceRequest {
    /// Rays cast from a persistent reference space
    Space(ReferenceSpace),
    /// Rays cast from transient inputs matching a profile (e.g. screen taps)
    Transient { profile: String },
}

/// Handle to a platform hit-test source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitTestSource {
    pub id: u64,
    pub request: HitTestSourceRequest,
}

/// Hit results for one transient input, closest first
#[derive(Debug, Clone, PartialEq)]
pub struct TransientHitResults {
    pub input_source: InputSourceId,
    pub results: Vec<Pose>,
}

/// A live immersive session
#[async_trait::async_trait]
pub trait XrSession: Send + Sync + fmt::Debug {
    fn id(&self) -> SessionId;

    fn mode(&self) -> SessionMode;

    async fn request_reference_space(
        &self,
        kind: ReferenceSpaceKind,
    ) -> Result<ReferenceSpace, XrError>;

    async fn request_hit_test_source(
        &self,
        request: HitTestSourceRequest,
    ) -> Result<HitTestSource, XrError>;

    /// Ask the platform to end the session
    ///
    /// The platform confirms with [`XrSignal::SessionEnded`] and
    /// [`XrSignal::ExitXr`].
    async fn end(&self) -> Result<(), XrError>;
}

/// The platform entry point
#[async_trait::async_trait]
pub trait XrPlatform: Send + Sync + fmt::Debug {
    /// Whether `mode` can be requested at all on this device
    async fn is_session_supported(&self, mode: SessionMode) -> bool;

    async fn request_session(
        &self,
        mode: SessionMode,
        features: &SessionFeatures,
    ) -> Result<Arc<dyn XrSession>, XrError>;
}

/// One render frame of a session
///
/// Poses are expressed in the renderer's base reference space.
pub trait XrFrame: Send + Sync {
    fn session_id(&self) -> SessionId;

    /// Viewer pose for this frame, if tracking is available
    fn viewer_pose(&self) -> Option<Pose>;

    /// Results for a space-anchored source, closest first
    fn hit_test_results(&self, source: &HitTestSource) -> Vec<Pose>;

    /// Results for a transient source, one entry per active input
    fn transient_hit_test_results(&self, source: &HitTestSource) -> Vec<TransientHitResults>;
}

/// Session lifecycle signals delivered by the platform
#[derive(Debug, Clone)]
pub enum XrSignal {
    /// A session is running and can serve requests
    SessionStarted(Arc<dyn XrSession>),
    /// The session ended; its sources and spaces are gone
    SessionEnded(SessionId),
    /// Presentation switched into an immersive mode
    EnterXr(SessionMode),
    /// Presentation left immersive mode
    ExitXr,
}
