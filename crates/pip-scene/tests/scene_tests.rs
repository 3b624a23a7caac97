use pip_core::overlay::{PRIMARY_BUTTON, TITLE};
use pip_core::{EventStream, Pose, Vec3};
use pip_scene::{
    ArScene, ArSceneConfig, SceneError, SceneEvent, SceneMode, UrlModelStorage, EXIT_BUTTON,
};
use pip_test_utils::{fixture_texts, widget, FakeFrame, FakeXrPlatform, RecordingRenderer};
use pip_xr::{SessionMode, XrError, XrSignal};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    platform: Arc<FakeXrPlatform>,
    renderer: Arc<RecordingRenderer>,
    scene: ArScene,
    events: EventStream<SceneEvent>,
}

impl Fixture {
    fn new() -> Self {
        Self::with(FakeXrPlatform::new(), RecordingRenderer::new())
    }

    fn with(platform: FakeXrPlatform, renderer: RecordingRenderer) -> Self {
        let platform = Arc::new(platform);
        let renderer = Arc::new(renderer);
        let scene = ArScene::new(
            ArSceneConfig::default(),
            platform.clone(),
            renderer.clone(),
            Arc::new(UrlModelStorage::new("https://storage.test")),
            fixture_texts(),
        );
        let events = scene.subscribe();
        Self {
            platform,
            renderer,
            scene,
            events,
        }
    }

    async fn pump(&mut self) {
        loop {
            let signals = self.platform.take_signals();
            if signals.is_empty() {
                break;
            }
            for signal in signals {
                self.scene.handle_signal(signal).await;
            }
        }
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&mut self) {
        self.scene.select(widget()).await.unwrap();
        self.pump().await;
        assert!(self.scene.reticle().hit_test().is_ready());
    }

    fn frame(&self) -> FakeFrame {
        FakeFrame::new(self.scene.session_id().unwrap())
    }

    fn tick(&mut self, hit: Option<Pose>) {
        let mut frame = self.frame();
        if let Some(pose) = hit {
            frame = frame.with_hit(pose);
        }
        self.scene.on_frame(&frame);
    }

    fn primary_enabled(&self) -> bool {
        self.scene.overlay().button(PRIMARY_BUTTON).unwrap().enabled
    }
}

fn table(z: f32) -> Pose {
    Pose::at(Vec3::new(0.2, -0.7, z))
}

#[tokio::test]
async fn test_select_enters_placing() {
    let mut f = Fixture::new();
    f.enter().await;

    assert_eq!(f.scene.mode(), SceneMode::Placing);
    assert_eq!(f.events.drain(), vec![SceneEvent::ModeChanged(SceneMode::Placing)]);
    assert!(f.scene.is_visible());
    assert!(f.renderer.scene_visible());
    assert_eq!(
        f.renderer.loaded_model().as_deref(),
        Some("https://storage.test/models/m1")
    );
    assert!(!f.renderer.model_visible());
    assert_eq!(f.scene.product().map(|p| p.name.as_str()), Some("Widget"));

    let overlay = f.scene.overlay();
    assert_eq!(overlay.text(TITLE), Some("Find a surface"));
    assert_eq!(overlay.button(PRIMARY_BUTTON).unwrap().label, "Place here");
    assert_eq!(overlay.button(EXIT_BUTTON).unwrap().label, "Close");
    assert!(!f.primary_enabled());
}

#[tokio::test]
async fn test_surface_gates_primary_button() {
    let mut f = Fixture::new();
    f.enter().await;

    f.tick(None);
    assert!(!f.primary_enabled());

    f.tick(Some(table(-1.0)));
    assert!(f.primary_enabled());
    assert_eq!(f.renderer.reticle(), Some(table(-1.0)));

    f.tick(None);
    assert!(!f.primary_enabled());
    assert_eq!(f.renderer.reticle(), None);
}

#[tokio::test(start_paused = true)]
async fn test_proceed_anchors_model_at_reticle_pose() {
    let mut f = Fixture::new();
    f.enter().await;
    f.events.drain();

    f.tick(Some(table(-1.2)));
    assert!(f.scene.proceed().await);

    assert_eq!(f.scene.mode(), SceneMode::Viewing);
    assert_eq!(f.scene.anchor(), Some(table(-1.2)));
    assert_eq!(f.renderer.model_pose(), Some(table(-1.2)));
    assert!(f.renderer.model_visible());
    assert_eq!(f.renderer.reticle(), None);
    assert!(!f.scene.reticle().is_testing());
    assert_eq!(
        f.scene.overlay().button(PRIMARY_BUTTON).unwrap().label,
        "Proceed"
    );
    assert!(f.primary_enabled());
    assert_eq!(f.events.drain(), vec![SceneEvent::ModeChanged(SceneMode::Viewing)]);

    // Frames while viewing leave the model where it is
    f.tick(Some(table(-3.0)));
    assert_eq!(f.renderer.model_pose(), Some(table(-1.2)));

    tokio::time::advance(Duration::from_millis(600)).await;
    assert!(f.scene.proceed().await);
    assert_eq!(f.scene.mode(), SceneMode::Placing);
    assert!(!f.renderer.model_visible());
    assert!(f.scene.reticle().is_testing());
}

#[tokio::test(start_paused = true)]
async fn test_proceed_triggers_within_window_collapse() {
    let mut f = Fixture::new();
    f.enter().await;
    f.tick(Some(table(-1.0)));

    assert!(f.scene.proceed().await);
    tokio::time::advance(Duration::from_millis(100)).await;
    assert!(!f.scene.proceed().await);
    assert_eq!(f.scene.mode(), SceneMode::Viewing);

    tokio::time::advance(Duration::from_millis(600)).await;
    assert!(f.scene.proceed().await);
    assert_eq!(f.scene.mode(), SceneMode::Placing);
}

#[tokio::test]
async fn test_proceed_without_surface_stays_placing() {
    let mut f = Fixture::new();
    f.enter().await;
    f.tick(None);

    assert!(!f.scene.proceed().await);
    assert_eq!(f.scene.mode(), SceneMode::Placing);
    assert_eq!(f.scene.anchor(), None);
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_session_once() {
    let mut f = Fixture::new();
    f.enter().await;
    f.tick(Some(table(-1.0)));
    f.scene.proceed().await;
    f.events.drain();

    let session = f.platform.last_session().unwrap();
    assert!(f.scene.stop().await);
    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert!(session.is_ended());
    assert_eq!(session.end_calls(), 1);

    // Platform confirmation must not end the scene a second time
    f.pump().await;
    assert_eq!(
        f.events.drain(),
        vec![SceneEvent::ModeChanged(SceneMode::Inactive), SceneEvent::End]
    );
    assert!(!f.renderer.model_visible());
    assert_eq!(f.scene.session_id(), None);

    tokio::time::advance(Duration::from_millis(600)).await;
    assert!(!f.scene.stop().await);
}

#[tokio::test]
async fn test_platform_exit_ends_scene() {
    let mut f = Fixture::new();
    f.enter().await;
    f.events.drain();

    f.platform.exit_presentation();
    f.pump().await;

    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert_eq!(
        f.events.drain(),
        vec![SceneEvent::ModeChanged(SceneMode::Inactive), SceneEvent::End]
    );
    assert!(!f.scene.reticle().hit_test().is_ready());
}

/// Deliver only the session start, as if presentation were still pending
async fn start_without_presenting(f: &mut Fixture) {
    f.scene.select(widget()).await.unwrap();
    for signal in f.platform.take_signals() {
        if matches!(signal, XrSignal::SessionStarted(_)) {
            f.scene.handle_signal(signal).await;
        }
    }
    assert_eq!(f.scene.mode(), SceneMode::Inactive);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_presentation_ends_attempt() {
    let mut f = Fixture::new();
    f.scene.select(widget()).await.unwrap();
    let session = f.platform.last_session().unwrap();

    assert!(f.scene.stop().await);
    assert!(session.is_ended());
    assert_eq!(session.end_calls(), 1);
    assert_eq!(f.scene.session_id(), None);

    // Queued enter and the end confirmation arrive for a session we dropped
    f.pump().await;
    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert_eq!(f.events.drain(), vec![SceneEvent::End]);
}

#[tokio::test(start_paused = true)]
async fn test_platform_exit_before_presentation_ends_attempt() {
    let mut f = Fixture::new();
    start_without_presenting(&mut f).await;

    f.platform.exit_presentation();
    f.pump().await;

    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert_eq!(f.scene.session_id(), None);
    assert!(!f.scene.reticle().is_visible());
    assert_eq!(f.events.drain(), vec![SceneEvent::End]);

    tokio::time::advance(Duration::from_millis(600)).await;
    assert!(!f.scene.stop().await);
    assert!(f.events.drain().is_empty());
}

#[tokio::test]
async fn test_exit_signal_alone_before_presentation_ends_session() {
    let mut f = Fixture::new();
    start_without_presenting(&mut f).await;
    let session = f.platform.last_session().unwrap();

    f.scene.handle_signal(XrSignal::ExitXr).await;
    assert!(session.is_ended());
    assert_eq!(session.end_calls(), 1);
    assert_eq!(f.scene.session_id(), None);

    f.pump().await;
    assert_eq!(f.events.drain(), vec![SceneEvent::End]);
}

#[tokio::test]
async fn test_unsupported_ar_is_refused_without_request() {
    let mut f = Fixture::with(
        FakeXrPlatform::new().without_support(SessionMode::ImmersiveAr),
        RecordingRenderer::new(),
    );

    let err = f.scene.select(widget()).await.unwrap_err();
    assert_eq!(
        err,
        SceneError::SessionRequest(XrError::Unsupported(SessionMode::ImmersiveAr))
    );
    assert_eq!(f.platform.request_count(), 0);
    assert!(!f.scene.is_visible());

    let events = f.events.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SceneEvent::Error(message) if message.starts_with("could not enter augmented reality mode")
    ));
}

#[tokio::test]
async fn test_refused_session_reports_error_without_state_change() {
    let mut f = Fixture::new();
    f.platform
        .fail_next(XrError::PermissionDenied("camera".into()));

    let err = f.scene.select(widget()).await.unwrap_err();
    assert!(err.is_permission());
    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert!(!f.scene.is_visible());
    assert_eq!(f.scene.session_id(), None);

    let events = f.events.drain();
    assert_eq!(events.len(), 1);
    match &events[0] {
        SceneEvent::Error(message) => {
            assert!(message.starts_with("could not enter augmented reality mode"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    // The attempt is over; a new one works
    f.enter().await;
    assert_eq!(f.scene.mode(), SceneMode::Placing);
}

#[tokio::test]
async fn test_vr_landing_fails_attempt() {
    let mut f = Fixture::new();
    f.platform.land_in(SessionMode::ImmersiveVr);

    f.scene.select(widget()).await.unwrap();
    f.pump().await;

    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert!(f.platform.last_session().unwrap().is_ended());
    assert_eq!(
        f.events.drain(),
        vec![SceneEvent::Error("VR mode is not yet implemented".into())]
    );
}

#[tokio::test]
async fn test_inline_landing_fails_attempt() {
    let mut f = Fixture::new();
    f.platform.land_in(SessionMode::Inline);

    f.scene.select(widget()).await.unwrap();
    f.pump().await;

    assert_eq!(f.scene.mode(), SceneMode::Inactive);
    assert_eq!(
        f.events.drain(),
        vec![SceneEvent::Error("could not enter augmented reality mode".into())]
    );
}

#[tokio::test]
async fn test_hit_test_source_failure_is_reported() {
    let mut f = Fixture::new();
    f.scene.select(widget()).await.unwrap();
    f.platform
        .last_session()
        .unwrap()
        .fail_hit_test_source(XrError::HitTestSourceUnavailable("no planes".into()));
    f.pump().await;

    assert_eq!(f.scene.mode(), SceneMode::Placing);
    let events = f.events.drain();
    assert!(events.contains(&SceneEvent::Error(
        "surface detection unavailable: hit-test source unavailable: no planes".into()
    )));
}

#[tokio::test]
async fn test_select_while_active_is_rejected() {
    let mut f = Fixture::new();
    f.enter().await;

    let err = f.scene.select(widget()).await.unwrap_err();
    assert!(matches!(err, SceneError::AlreadyActive));
    assert_eq!(f.platform.request_count(), 1);
}

#[tokio::test]
async fn test_scene_is_reusable_after_end() {
    let mut f = Fixture::new();
    f.enter().await;
    let first = f.scene.session_id().unwrap();
    f.scene.stop().await;
    f.pump().await;

    f.enter().await;
    assert_ne!(f.scene.session_id().unwrap(), first);
    assert_eq!(f.scene.mode(), SceneMode::Placing);
}

#[test]
fn test_active_follows_render_loop() {
    let f = Fixture::with(FakeXrPlatform::new(), RecordingRenderer::not_started());
    assert!(!f.scene.active());
    f.renderer.set_started(true);
    assert!(f.scene.active());
}
