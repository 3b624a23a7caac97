//! Error types for the barcode scanner

/// Scanner failures
///
/// Each one leaves the scanner defunct until the next `start()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScannerError {
    /// Camera could not be acquired or was lost
    #[error("camera unavailable: {0}")]
    Camera(String),

    /// Decoder runtime failed to initialize
    #[error("decoder initialization failed: {0}")]
    DecoderInit(String),

    /// Invalid scanner configuration
    #[error("invalid scanner configuration: {0}")]
    Config(String),
}

impl ScannerError {
    /// Whether the failure is about camera access
    #[inline]
    #[must_use]
    pub fn is_camera(&self) -> bool {
        matches!(self, Self::Camera(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_error_display() {
        let err = ScannerError::Camera("NotAllowedError".into());
        assert_eq!(err.to_string(), "camera unavailable: NotAllowedError");
        assert!(err.is_camera());
        assert!(!ScannerError::Config("x".into()).is_camera());
    }
}
