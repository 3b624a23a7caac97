//! Camera and decoder fakes
//!
//! A "frame" here is just the barcode payload written into the luma bytes.
//! [`EchoDecoder`] reads it back, so pushing [`code_frame`]s into a
//! [`FakeCamera`] is all a test needs to simulate a scan.

use parking_lot::Mutex;
use pip_core::BarcodeValue;
use pip_scanner::{
    BarcodeDecoder, Camera, Detection, Frame, FrameSource, ScannerError, Symbology,
    VideoConstraints,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A frame carrying `code` as its pixel data
#[must_use]
pub fn code_frame(code: &str) -> Frame {
    let luma = code.as_bytes().to_vec();
    Frame {
        width: u32::try_from(luma.len()).unwrap_or(u32::MAX),
        height: 1,
        luma,
    }
}

#[derive(Debug, Default)]
struct Shared {
    frames: Mutex<VecDeque<Frame>>,
    lost: AtomicBool,
    closes: AtomicUsize,
}

/// Camera fed from a frame queue
#[derive(Debug, Default)]
pub struct FakeCamera {
    shared: Arc<Shared>,
    denied: AtomicBool,
    opens: AtomicUsize,
    last_constraints: Mutex<Option<VideoConstraints>>,
}

impl FakeCamera {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame showing `code`
    pub fn show_code(&self, code: &str) {
        self.push_frame(code_frame(code));
    }

    pub fn push_frame(&self, frame: Frame) {
        self.shared.frames.lock().push_back(frame);
    }

    /// Refuse access on the next opens, like a denied permission prompt
    pub fn deny_access(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    /// Fail the next grab of any open stream
    pub fn lose_device(&self) {
        self.shared.lost.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn close_count(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.shared.frames.lock().len()
    }

    #[must_use]
    pub fn last_constraints(&self) -> Option<VideoConstraints> {
        *self.last_constraints.lock()
    }
}

#[async_trait::async_trait]
impl Camera for FakeCamera {
    async fn open(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Box<dyn FrameSource>, ScannerError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(ScannerError::Camera("NotAllowedError: permission denied".into()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.shared.lost.store(false, Ordering::SeqCst);
        *self.last_constraints.lock() = Some(constraints);
        Ok(Box::new(QueueSource {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct QueueSource {
    shared: Arc<Shared>,
}

impl FrameSource for QueueSource {
    fn grab(&mut self) -> Result<Option<Frame>, ScannerError> {
        if self.shared.lost.load(Ordering::SeqCst) {
            return Err(ScannerError::Camera("device disconnected".into()));
        }
        Ok(self.shared.frames.lock().pop_front())
    }

    fn close(&mut self) {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Decoder that reads the payload out of the frame bytes
///
/// The symbology is guessed from the payload length: 13 digits EAN-13,
/// 12 UPC-A, 8 EAN-8, anything else Code 128.
#[derive(Debug, Default)]
pub struct EchoDecoder {
    fail_init: AtomicBool,
    inits: AtomicUsize,
}

impl EchoDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BarcodeDecoder for EchoDecoder {
    async fn init(&self, _symbologies: &[Symbology]) -> Result<(), ScannerError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(ScannerError::DecoderInit("runtime not loaded".into()));
        }
        Ok(())
    }

    fn decode(&self, frame: &Frame, _symbologies: &[Symbology]) -> Vec<Detection> {
        let Ok(text) = std::str::from_utf8(&frame.luma) else {
            return Vec::new();
        };
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let all_digits = text.bytes().all(|b| b.is_ascii_digit());
        let symbology = match text.len() {
            13 if all_digits => Symbology::Ean13,
            12 if all_digits => Symbology::UpcA,
            8 if all_digits => Symbology::Ean8,
            _ => Symbology::Code128,
        };
        vec![Detection {
            code: BarcodeValue::from(text),
            symbology,
            confidence: 1.0,
        }]
    }
}
