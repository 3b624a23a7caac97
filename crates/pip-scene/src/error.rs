//! Error types for the AR scene

use pip_xr::XrError;

/// Presentation landed in VR instead of AR
pub const VR_NOT_IMPLEMENTED: &str = "VR mode is not yet implemented";

/// Presentation landed in a non-immersive mode
pub const COULD_NOT_ENTER_AR: &str = "could not enter augmented reality mode";

/// AR scene failures
///
/// These abandon the current AR attempt only. The scene stays usable for a
/// fresh `select()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// Immersive session could not be started
    #[error("could not enter augmented reality mode: {0}")]
    SessionRequest(#[from] XrError),

    /// A session is already running
    #[error("an AR session is already active")]
    AlreadyActive,

    /// Hit testing could not be set up for the session
    #[error("surface detection unavailable: {0}")]
    HitTestUnavailable(XrError),
}

impl SceneError {
    /// Whether the user denied a permission the session needs
    #[inline]
    #[must_use]
    pub fn is_permission(&self) -> bool {
        match self {
            Self::SessionRequest(e) | Self::HitTestUnavailable(e) => e.is_permission(),
            Self::AlreadyActive => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pip_xr::SessionMode;

    #[test]
    fn session_request_message_carries_detail() {
        let err = SceneError::from(XrError::Unsupported(SessionMode::ImmersiveAr));
        let message = err.to_string();
        assert!(message.starts_with("could not enter augmented reality mode: "));
        assert!(message.contains("not supported"));
    }

    #[test]
    fn permission_detection() {
        assert!(SceneError::SessionRequest(XrError::PermissionDenied("x".into())).is_permission());
        assert!(!SceneError::AlreadyActive.is_permission());
    }
}
