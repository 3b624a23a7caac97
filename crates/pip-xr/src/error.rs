//! Error types for the XR platform layer

use crate::platform::{ReferenceSpaceKind, SessionMode};

/// Platform-level XR failures
///
/// All of these abandon the current AR attempt; none of them are raised for
/// the normal absence of a surface under the reticle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XrError {
    /// The device or browser cannot provide this session mode
    #[error("session mode not supported: {0:?}")]
    Unsupported(SessionMode),

    /// The user or platform refused the session
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Session request failed for another reason
    #[error("session request failed: {0}")]
    SessionRequestFailed(String),

    /// Reference space could not be created
    #[error("reference space unavailable: {0:?}")]
    ReferenceSpaceUnavailable(ReferenceSpaceKind),

    /// Hit-test source could not be created
    #[error("hit-test source unavailable: {0}")]
    HitTestSourceUnavailable(String),

    /// Operation on a session that already ended
    #[error("session ended")]
    SessionEnded,
}

impl XrError {
    /// Whether the user can fix this by granting a permission
    #[inline]
    #[must_use]
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
