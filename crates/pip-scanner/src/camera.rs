//! Camera capture interface

use crate::error::ScannerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which camera to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Back camera, pointing at the product
    #[default]
    Environment,
    User,
}

/// Capture preferences passed to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

/// One grayscale camera frame
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major luma, `width * height` bytes
    pub luma: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.luma.len())
            .finish()
    }
}

/// An opened capture stream
pub trait FrameSource: Send {
    /// Most recent frame, or `None` if no new frame arrived since the last grab
    ///
    /// # Errors
    /// Returns `ScannerError::Camera` if the device was lost.
    fn grab(&mut self) -> Result<Option<Frame>, ScannerError>;

    /// Release the device
    fn close(&mut self) {}
}

/// Camera capture device
#[async_trait::async_trait]
pub trait Camera: Send + Sync + fmt::Debug {
    /// Acquire the device and start streaming
    ///
    /// # Errors
    /// Returns `ScannerError::Camera` when permission is denied or no camera
    /// matches the constraints.
    async fn open(&self, constraints: VideoConstraints) -> Result<Box<dyn FrameSource>, ScannerError>;
}
