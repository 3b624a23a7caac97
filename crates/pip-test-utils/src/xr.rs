//! Scripted XR platform
//!
//! Lifecycle signals are not pushed anywhere. They queue up on the platform
//! and tests forward them with [`FakeXrPlatform::take_signals`], which keeps
//! the interleaving with other inputs under the test's control.

use parking_lot::Mutex;
use pip_core::{Pose, Vec3};
use pip_xr::{
    HitTestSource, HitTestSourceRequest, InputSourceId, ReferenceSpace, ReferenceSpaceKind,
    SessionFeatures, SessionId, SessionMode, TransientHitResults, XrError, XrFrame, XrPlatform,
    XrSession, XrSignal,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

type SignalQueue = Arc<Mutex<VecDeque<XrSignal>>>;

#[derive(Debug)]
pub struct FakeSession {
    id: SessionId,
    mode: SessionMode,
    ended: AtomicBool,
    end_calls: AtomicUsize,
    next_handle: AtomicU64,
    source_gate: Option<Arc<Notify>>,
    fail_source: Mutex<Option<XrError>>,
    signals: SignalQueue,
}

impl FakeSession {
    fn new(
        id: SessionId,
        mode: SessionMode,
        source_gate: Option<Arc<Notify>>,
        signals: SignalQueue,
    ) -> Self {
        Self {
            id,
            mode,
            ended: AtomicBool::new(false),
            end_calls: AtomicUsize::new(0),
            next_handle: AtomicU64::new(1),
            source_gate,
            fail_source: Mutex::new(None),
            signals,
        }
    }

    /// Make the next hit-test source request fail
    pub fn fail_hit_test_source(&self, error: XrError) {
        *self.fail_source.lock() = Some(error);
    }

    /// Let a gated hit-test source request resolve
    pub fn release_source(&self) {
        if let Some(gate) = &self.source_gate {
            gate.notify_one();
        }
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn end_calls(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    fn handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl XrSession for FakeSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn mode(&self) -> SessionMode {
        self.mode
    }

    async fn request_reference_space(
        &self,
        kind: ReferenceSpaceKind,
    ) -> Result<ReferenceSpace, XrError> {
        if self.is_ended() {
            return Err(XrError::SessionEnded);
        }
        Ok(ReferenceSpace {
            id: self.handle(),
            kind,
        })
    }

    async fn request_hit_test_source(
        &self,
        request: HitTestSourceRequest,
    ) -> Result<HitTestSource, XrError> {
        if let Some(gate) = &self.source_gate {
            gate.notified().await;
        }
        if let Some(error) = self.fail_source.lock().take() {
            return Err(error);
        }
        if self.is_ended() {
            return Err(XrError::SessionEnded);
        }
        Ok(HitTestSource {
            id: self.handle(),
            request,
        })
    }

    async fn end(&self) -> Result<(), XrError> {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
        if self.ended.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut signals = self.signals.lock();
        signals.push_back(XrSignal::SessionEnded(self.id));
        signals.push_back(XrSignal::ExitXr);
        Ok(())
    }
}

/// XR platform whose sessions always start
///
/// Each granted session queues `SessionStarted` followed by `EnterXr` with
/// the configured presentation mode.
#[derive(Debug)]
pub struct FakeXrPlatform {
    supported: Vec<SessionMode>,
    presentation: Mutex<SessionMode>,
    gate_sources: bool,
    fail_next: Mutex<Option<XrError>>,
    next_id: AtomicU64,
    requests: AtomicUsize,
    sessions: Mutex<Vec<(Arc<FakeSession>, Option<Arc<Notify>>)>>,
    signals: SignalQueue,
}

impl Default for FakeXrPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeXrPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: vec![SessionMode::ImmersiveAr, SessionMode::Inline],
            presentation: Mutex::new(SessionMode::ImmersiveAr),
            gate_sources: false,
            fail_next: Mutex::new(None),
            next_id: AtomicU64::new(1),
            requests: AtomicUsize::new(0),
            sessions: Mutex::new(Vec::new()),
            signals: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Hold hit-test source requests until [`FakeXrPlatform::release_sources`]
    #[must_use]
    pub fn with_gated_sources(mut self) -> Self {
        self.gate_sources = true;
        self
    }

    /// Report `mode` as unavailable on this device
    #[must_use]
    pub fn without_support(mut self, mode: SessionMode) -> Self {
        self.supported.retain(|m| *m != mode);
        self
    }

    /// Presentation mode reported after the next grants
    pub fn land_in(&self, mode: SessionMode) {
        *self.presentation.lock() = mode;
    }

    /// Refuse the next session request
    pub fn fail_next(&self, error: XrError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Drain the queued lifecycle signals
    #[must_use]
    pub fn take_signals(&self) -> Vec<XrSignal> {
        self.signals.lock().drain(..).collect()
    }

    /// Queue an exit as if the user left AR through the platform UI
    pub fn exit_presentation(&self) {
        let mut signals = self.signals.lock();
        if let Some((session, _)) = self.sessions.lock().last() {
            if !session.ended.swap(true, Ordering::SeqCst) {
                signals.push_back(XrSignal::SessionEnded(session.id));
            }
        }
        signals.push_back(XrSignal::ExitXr);
    }

    pub fn release_sources(&self) {
        for gate in self.sessions.lock().iter().filter_map(|(_, gate)| gate.as_ref()) {
            gate.notify_one();
        }
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_session(&self) -> Option<Arc<FakeSession>> {
        self.sessions.lock().last().map(|(s, _)| Arc::clone(s))
    }
}

#[async_trait::async_trait]
impl XrPlatform for FakeXrPlatform {
    async fn is_session_supported(&self, mode: SessionMode) -> bool {
        self.supported.contains(&mode)
    }

    async fn request_session(
        &self,
        mode: SessionMode,
        features: &SessionFeatures,
    ) -> Result<Arc<dyn XrSession>, XrError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        if !self.supported.contains(&mode) {
            return Err(XrError::Unsupported(mode));
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let gate = self.gate_sources.then(|| Arc::new(Notify::new()));
        let session = Arc::new(FakeSession::new(
            id,
            mode,
            gate.clone(),
            Arc::clone(&self.signals),
        ));
        tracing::debug!("fake platform granted {} ({:?})", id, features.required);

        self.sessions.lock().push((Arc::clone(&session), gate));
        let presentation = *self.presentation.lock();
        let mut signals = self.signals.lock();
        signals.push_back(XrSignal::SessionStarted(session.clone()));
        signals.push_back(XrSignal::EnterXr(presentation));
        Ok(session)
    }
}

/// One scripted render frame
#[derive(Debug, Clone, PartialEq)]
pub struct FakeFrame {
    session: SessionId,
    viewer: Option<Pose>,
    hits: Vec<Pose>,
    transient: Vec<TransientHitResults>,
}

impl FakeFrame {
    /// Frame with a tracked viewer and no surfaces
    #[must_use]
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            viewer: Some(Pose::at(Vec3::new(0.0, 1.6, 0.0))),
            hits: Vec::new(),
            transient: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hit(mut self, pose: Pose) -> Self {
        self.hits.push(pose);
        self
    }

    #[must_use]
    pub fn with_transient(mut self, input: u32, results: Vec<Pose>) -> Self {
        self.transient.push(TransientHitResults {
            input_source: InputSourceId(input),
            results,
        });
        self
    }

    /// Tracking lost for this frame
    #[must_use]
    pub fn without_viewer(mut self) -> Self {
        self.viewer = None;
        self
    }
}

impl XrFrame for FakeFrame {
    fn session_id(&self) -> SessionId {
        self.session
    }

    fn viewer_pose(&self) -> Option<Pose> {
        self.viewer
    }

    fn hit_test_results(&self, source: &HitTestSource) -> Vec<Pose> {
        match source.request {
            HitTestSourceRequest::Space(_) => self.hits.clone(),
            HitTestSourceRequest::Transient { .. } => Vec::new(),
        }
    }

    fn transient_hit_test_results(&self, source: &HitTestSource) -> Vec<TransientHitResults> {
        match source.request {
            HitTestSourceRequest::Transient { .. } => self.transient.clone(),
            HitTestSourceRequest::Space(_) => Vec::new(),
        }
    }
}
