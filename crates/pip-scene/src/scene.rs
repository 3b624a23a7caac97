//! The AR scene component
//!
//! [`ArScene`] owns one immersive attempt at a time:
//! - `select()` asks the platform for an AR session and starts loading the
//!   product's model
//! - platform signals drive the mode machine from [`crate::mode`]
//! - `on_frame()` ticks the reticle and gates the primary button
//! - `proceed()` and `stop()` are the user's debounced controls
//!
//! Everything observable leaves through [`SceneEvent`]s on the scene's bus.

use crate::config::ArSceneConfig;
use crate::error::SceneError;
use crate::mode::{transition, SceneCommand, SceneInput, SceneMode, Transition};
use crate::renderer::{RenderCommand, SceneRenderer};
use crate::storage::ModelStorage;
use pip_core::overlay::PRIMARY_BUTTON;
use pip_core::{
    AppTexts, Debouncer, EventBus, EventStream, Overlay, Pose, Product, TextMode,
};
use pip_xr::{
    HitTest, Reticle, ReticleEvent, ReticleUpdate, SessionId, SessionMode, XrFrame, XrPlatform,
    XrError, XrSession, XrSignal,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Overlay key of the exit control
pub const EXIT_BUTTON: &str = "exit";

/// Events published by the scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// The mode machine moved to a new mode
    ModeChanged(SceneMode),
    /// The current AR attempt failed; the message is user-facing
    Error(String),
    /// The AR session is over
    End,
}

#[derive(Debug)]
pub struct ArScene {
    config: ArSceneConfig,
    platform: Arc<dyn XrPlatform>,
    renderer: Arc<dyn SceneRenderer>,
    storage: Arc<dyn ModelStorage>,
    reticle: Reticle,
    reticle_events: EventStream<ReticleEvent>,
    mode: SceneMode,
    texts: AppTexts,
    overlay: Overlay,
    product: Option<Product>,
    anchor: Option<Pose>,
    session: Option<Arc<dyn XrSession>>,
    source_request: Option<JoinHandle<()>>,
    visible: bool,
    proceed_debounce: Debouncer,
    stop_debounce: Debouncer,
    events: EventBus<SceneEvent>,
}

impl ArScene {
    #[must_use]
    pub fn new(
        config: ArSceneConfig,
        platform: Arc<dyn XrPlatform>,
        renderer: Arc<dyn SceneRenderer>,
        storage: Arc<dyn ModelStorage>,
        texts: AppTexts,
    ) -> Self {
        let reticle = Reticle::new(HitTest::new(config.hit_test.clone()));
        let reticle_events = reticle.subscribe();

        let mut overlay = Overlay::new();
        overlay.apply_mode(&texts.for_mode(TextMode::Placing));
        overlay.set_button_enabled(PRIMARY_BUTTON, false);
        overlay.set_button(EXIT_BUTTON, texts.exit_label());
        overlay.set_button_enabled(EXIT_BUTTON, true);

        Self {
            proceed_debounce: Debouncer::new(config.debounce),
            stop_debounce: Debouncer::new(config.debounce),
            config,
            platform,
            renderer,
            storage,
            reticle,
            reticle_events,
            mode: SceneMode::Inactive,
            texts,
            overlay,
            product: None,
            anchor: None,
            session: None,
            source_request: None,
            visible: false,
            events: EventBus::default(),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> EventStream<SceneEvent> {
        self.events.subscribe()
    }

    /// Whether the renderer's loop is running and a model can be shown
    #[must_use]
    pub fn active(&self) -> bool {
        self.renderer.render_started()
    }

    /// Start an AR attempt for `product`
    ///
    /// The attempt only requests the session. The mode moves once the
    /// platform reports where presentation landed.
    ///
    /// # Errors
    /// [`SceneError::AlreadyActive`] if a session is already running.
    /// [`SceneError::SessionRequest`] if the platform refused; this is also
    /// published as a [`SceneEvent::Error`].
    pub async fn select(&mut self, product: Product) -> Result<(), SceneError> {
        if self.session.is_some() || self.mode.is_active() {
            return Err(SceneError::AlreadyActive);
        }

        tracing::info!("requesting AR session for {}", product.name);
        let requested = if self
            .platform
            .is_session_supported(SessionMode::ImmersiveAr)
            .await
        {
            self.platform
                .request_session(SessionMode::ImmersiveAr, &self.config.features)
                .await
        } else {
            Err(XrError::Unsupported(SessionMode::ImmersiveAr))
        };
        let session = match requested {
            Ok(session) => session,
            Err(e) => {
                let err = SceneError::from(e);
                tracing::warn!("{}", err);
                self.events.emit(SceneEvent::Error(err.to_string()));
                return Err(err);
            }
        };

        let url = self.storage.model_url(&product.model_reference);
        tracing::debug!("loading model {} for {}", url, session.id());
        self.renderer.apply(RenderCommand::LoadModel { url });
        self.renderer.apply(RenderCommand::SetModelVisible(false));

        self.product = Some(product);
        self.anchor = None;
        self.session = Some(session);
        self.show();
        Ok(())
    }

    /// React to a platform lifecycle signal
    pub async fn handle_signal(&mut self, signal: XrSignal) {
        match signal {
            XrSignal::SessionStarted(session) => {
                if !self.owns(session.id()) {
                    tracing::debug!("ignoring start of foreign {}", session.id());
                    return;
                }
                self.request_hit_test_source(session);
            }
            XrSignal::SessionEnded(id) => {
                self.reticle.hit_test().session_ended(id);
                if self.owns(id) {
                    tracing::debug!("{} ended", id);
                    self.abort_source_request();
                    self.session = None;
                    if !self.mode.is_active() {
                        self.abandon_attempt();
                    }
                }
            }
            XrSignal::EnterXr(mode) => {
                if self.session.is_none() {
                    tracing::debug!("ignoring {:?} presentation without a session", mode);
                    return;
                }
                let t = transition(self.mode, SceneInput::Entered(mode));
                self.apply(t).await;
            }
            XrSignal::ExitXr => {
                if self.mode.is_active() {
                    let t = transition(self.mode, SceneInput::End);
                    self.apply(t).await;
                    self.abort_source_request();
                    self.session = None;
                } else if self.session.is_some() {
                    // Presentation never entered
                    self.end_session().await;
                    self.abandon_attempt();
                }
            }
        }
    }

    fn request_hit_test_source(&mut self, session: Arc<dyn XrSession>) {
        self.abort_source_request();
        let hit_test = self.reticle.hit_test().clone();
        let events = self.events.clone();
        self.source_request = Some(tokio::spawn(async move {
            if let Err(e) = hit_test.session_started(session).await {
                let err = SceneError::HitTestUnavailable(e);
                tracing::warn!("{}", err);
                events.emit(SceneEvent::Error(err.to_string()));
            }
        }));
    }

    fn abort_source_request(&mut self) {
        if let Some(task) = self.source_request.take() {
            task.abort();
        }
    }

    fn owns(&self, id: SessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id() == id)
    }

    /// Advance one render frame
    pub fn on_frame(&mut self, frame: &dyn XrFrame) {
        let was_visible = self.reticle.is_visible();
        match self.reticle.tick(frame) {
            ReticleUpdate::Idle => {}
            ReticleUpdate::Moved(pose) => {
                self.renderer.apply(RenderCommand::SetReticle(Some(pose)));
            }
            ReticleUpdate::Hidden => {
                if was_visible {
                    self.renderer.apply(RenderCommand::SetReticle(None));
                }
            }
        }

        while let Some(event) = self.reticle_events.try_next() {
            if self.mode != SceneMode::Placing {
                continue;
            }
            let found = matches!(event, ReticleEvent::Found(_));
            tracing::trace!("surface {}", if found { "found" } else { "lost" });
            self.overlay.set_button_enabled(PRIMARY_BUTTON, found);
        }
    }

    /// User pressed the primary button
    ///
    /// Returns whether the mode changed. Presses inside the debounce window
    /// and presses while no surface is under the reticle change nothing.
    pub async fn proceed(&mut self) -> bool {
        if !self.proceed_debounce.trigger() {
            tracing::trace!("proceed debounced");
            return false;
        }
        let anchor = self.reticle.last_hit().map(|hit| hit.pose);
        let t = transition(self.mode, SceneInput::Proceed { anchor });
        let changed = t.changes_mode(self.mode);
        self.apply(t).await;
        changed
    }

    /// User pressed the exit button
    ///
    /// Ends the session and publishes [`SceneEvent::End`] once. Returns
    /// whether anything was stopped.
    pub async fn stop(&mut self) -> bool {
        if !self.stop_debounce.trigger() {
            tracing::trace!("stop debounced");
            return false;
        }
        if self.session.is_none() && !self.mode.is_active() {
            return false;
        }

        tracing::info!("stopping AR session");
        self.end_session().await;
        if self.mode.is_active() {
            let t = transition(self.mode, SceneInput::End);
            self.apply(t).await;
        } else {
            self.abandon_attempt();
        }
        true
    }

    /// Close an attempt whose session went away before presentation
    fn abandon_attempt(&mut self) {
        tracing::info!("AR attempt ended before presentation");
        self.reticle.hide();
        self.events.emit(SceneEvent::End);
    }

    async fn apply(&mut self, t: Transition) {
        let previous = self.mode;
        self.mode = t.next;
        if previous != self.mode {
            tracing::info!("scene {} -> {}", previous, self.mode);
            self.events.emit(SceneEvent::ModeChanged(self.mode));
        }

        for command in t.commands {
            match command {
                SceneCommand::ShowReticle => {
                    self.overlay.set_button_enabled(PRIMARY_BUTTON, false);
                    self.reticle.show();
                }
                SceneCommand::HideReticle => {
                    self.reticle.hide();
                    self.renderer.apply(RenderCommand::SetReticle(None));
                }
                SceneCommand::PlaceModel(pose) => {
                    self.anchor = Some(pose);
                    self.renderer.apply(RenderCommand::PlaceModel(pose));
                }
                SceneCommand::ShowModel => {
                    self.renderer.apply(RenderCommand::SetModelVisible(true));
                }
                SceneCommand::HideModel => {
                    self.renderer.apply(RenderCommand::SetModelVisible(false));
                }
                SceneCommand::ApplyTexts(mode) => {
                    self.overlay.apply_mode(&self.texts.for_mode(mode));
                    if mode == TextMode::Viewing {
                        self.overlay.set_button_enabled(PRIMARY_BUTTON, true);
                    }
                }
                SceneCommand::EndSession => self.end_session().await,
                SceneCommand::EmitEnd => {
                    self.events.emit(SceneEvent::End);
                }
                SceneCommand::Fail(message) => {
                    tracing::warn!("AR attempt failed: {}", message);
                    self.events.emit(SceneEvent::Error(message));
                }
            }
        }
    }

    async fn end_session(&mut self) {
        self.abort_source_request();
        let Some(session) = self.session.take() else {
            return;
        };
        self.reticle.hit_test().session_ended(session.id());
        if let Err(e) = session.end().await {
            tracing::warn!("ending {} failed: {}", session.id(), e);
        }
    }

    /// Replace the text bundle and refresh the overlay
    pub fn set_texts(&mut self, texts: AppTexts) {
        self.texts = texts;
        let mode = match self.mode {
            SceneMode::Viewing => TextMode::Viewing,
            SceneMode::Inactive | SceneMode::Placing => TextMode::Placing,
        };
        self.overlay.apply_mode(&self.texts.for_mode(mode));
        self.overlay.set_button(EXIT_BUTTON, self.texts.exit_label());
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.renderer.apply(RenderCommand::SetSceneVisible(visible));
        }
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    /// Product of the current or most recent attempt
    #[inline]
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    /// Committed model pose while viewing
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<Pose> {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    #[inline]
    #[must_use]
    pub fn reticle(&self) -> &Reticle {
        &self.reticle
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ArSceneConfig {
        &self.config
    }
}

impl Drop for ArScene {
    fn drop(&mut self) {
        self.abort_source_request();
    }
}
