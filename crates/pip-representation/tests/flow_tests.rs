use pip_core::overlay::TITLE;
use pip_core::{EventStream, Pose, Vec3};
use pip_representation::{
    Control, Representation, RepresentationError, RepresentationEvent, Surface, CANDIDATE_TEXT,
    SELECT_BUTTON,
};
use pip_scene::SceneMode;
use pip_test_utils::{
    unknown_barcode, widget, FakeFrame, Harness, InstantLoader, WIDGET_BARCODE,
};
use pip_xr::{SessionMode, XrError, XrSignal};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

async fn started(h: &Harness) -> (Representation, EventStream<RepresentationEvent>) {
    let mut representation = h.load().await.unwrap();
    let events = representation.subscribe();
    representation.start().await;
    (representation, events)
}

/// Let spawned work (decode loop, hit-test source requests) run
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

async fn scan(h: &Harness, representation: &mut Representation, code: &str) {
    h.camera.show_code(code);
    tokio::time::sleep(Duration::from_millis(150)).await;
    representation.process_pending_events().await;
}

async fn enter_ar(h: &Harness, representation: &mut Representation) {
    scan(h, representation, WIDGET_BARCODE).await;
    assert!(representation.select().await);
    h.pump_signals(representation).await;
    settle().await;
}

fn surface(z: f32) -> Pose {
    Pose::at(Vec3::new(0.0, -1.1, z))
}

fn candidate_updates(events: &[RepresentationEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, RepresentationEvent::CandidateChanged(_)))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_widget_flow() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert_eq!(rep.scanner().overlay().text(TITLE), Some("Scan a product"));

    // Scan
    scan(&h, &mut rep, WIDGET_BARCODE).await;
    assert_eq!(rep.candidate(), Some(&widget()));
    assert_eq!(rep.scanner().overlay().text(CANDIDATE_TEXT), Some("Widget"));
    assert!(rep.scanner().overlay().button(SELECT_BUTTON).unwrap().enabled);
    assert_eq!(
        events.drain(),
        vec![
            RepresentationEvent::Ready,
            RepresentationEvent::CandidateChanged(widget())
        ]
    );

    // Select
    assert!(rep.select().await);
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scene]);
    assert!(!rep.scanner().is_running());
    assert_eq!(rep.candidate(), None);
    h.pump_signals(&mut rep).await;
    settle().await;
    assert_eq!(rep.scene().mode(), SceneMode::Placing);
    assert_eq!(
        h.renderer.loaded_model().as_deref(),
        Some("https://storage.test/models/m1")
    );

    // Place
    let session = rep.scene().session_id().unwrap();
    rep.on_frame(&FakeFrame::new(session).with_hit(surface(-1.3)));
    assert!(rep.proceed().await);
    assert_eq!(rep.scene().mode(), SceneMode::Viewing);
    assert_eq!(h.renderer.model_pose(), Some(surface(-1.3)));
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scene]);

    // Session ends from the platform side
    h.platform.exit_presentation();
    h.pump_signals(&mut rep).await;
    assert_eq!(rep.scene().mode(), SceneMode::Inactive);
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert!(rep.scanner().is_running());
    assert!(!h.renderer.scene_visible());
    assert_eq!(h.camera.open_count(), 2);

    assert_eq!(
        events.drain(),
        vec![
            RepresentationEvent::SurfaceChanged(Surface::Scene),
            RepresentationEvent::SceneModeChanged(SceneMode::Placing),
            RepresentationEvent::SceneModeChanged(SceneMode::Viewing),
            RepresentationEvent::SceneModeChanged(SceneMode::Inactive),
            RepresentationEvent::SurfaceChanged(Surface::Scanner),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_same_barcode_twice_is_one_candidate_update() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;

    h.camera.show_code(WIDGET_BARCODE);
    h.camera.show_code(WIDGET_BARCODE);
    tokio::time::sleep(Duration::from_millis(350)).await;
    rep.process_pending_events().await;

    assert_eq!(rep.scanner().stats().decodes_emitted, 2);
    assert_eq!(candidate_updates(&events.drain()), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_barcode_changes_nothing() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    events.drain();
    let revision = rep.scanner().overlay().revision();

    scan(&h, &mut rep, unknown_barcode()).await;

    assert_eq!(rep.scanner().stats().decodes_emitted, 1);
    assert_eq!(rep.candidate(), None);
    assert_eq!(rep.scanner().overlay().revision(), revision);
    assert!(events.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_new_product_replaces_candidate() {
    let h = Harness::new();
    let mut catalog = vec![widget()];
    catalog.push(pip_core::Product::new(
        unknown_barcode(),
        "Stabilo",
        pip_core::ModelReference::new("m2").unwrap(),
    ));
    h.api.set_products(catalog);
    let (mut rep, mut events) = started(&h).await;

    scan(&h, &mut rep, WIDGET_BARCODE).await;
    scan(&h, &mut rep, unknown_barcode()).await;
    scan(&h, &mut rep, WIDGET_BARCODE).await;

    assert_eq!(candidate_updates(&events.drain()), 3);
    assert_eq!(rep.candidate().map(|p| p.name.as_str()), Some("Widget"));
}

#[tokio::test(start_paused = true)]
async fn test_select_disabled_until_scene_renders() {
    let h = Harness::new();
    h.renderer.set_started(false);
    let (mut rep, _events) = started(&h).await;

    scan(&h, &mut rep, WIDGET_BARCODE).await;
    assert!(!rep.scanner().overlay().button(SELECT_BUTTON).unwrap().enabled);
    assert!(!rep.select().await);
    assert_eq!(h.platform.request_count(), 0);
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
}

#[tokio::test(start_paused = true)]
async fn test_select_is_debounced() {
    let h = Harness::new();
    let (mut rep, _events) = started(&h).await;
    scan(&h, &mut rep, WIDGET_BARCODE).await;

    assert!(rep.select().await);
    tokio::time::advance(Duration::from_millis(100)).await;
    assert!(!rep.select().await);
    assert_eq!(h.platform.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_proceed_twice_within_window_is_one_transition() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    enter_ar(&h, &mut rep).await;
    events.drain();

    let session = rep.scene().session_id().unwrap();
    rep.on_frame(&FakeFrame::new(session).with_hit(surface(-1.0)));
    assert!(rep.proceed().await);
    tokio::time::advance(Duration::from_millis(100)).await;
    assert!(!rep.proceed().await);

    assert_eq!(
        events.drain(),
        vec![RepresentationEvent::SceneModeChanged(SceneMode::Viewing)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_user_stop_returns_to_scanner() {
    let h = Harness::new();
    let (mut rep, _events) = started(&h).await;
    enter_ar(&h, &mut rep).await;

    assert!(rep.stop().await);
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert_eq!(rep.scene().mode(), SceneMode::Inactive);

    // Platform confirmation afterwards is harmless
    h.pump_signals(&mut rep).await;
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert!(h.platform.last_session().unwrap().is_ended());
    assert!(rep.scanner().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_camera_failure_reports_fixed_message() {
    let h = Harness::new();
    h.camera.deny_access(true);
    let (rep, mut events) = started(&h).await;

    assert_eq!(
        events.drain(),
        vec![
            RepresentationEvent::Ready,
            RepresentationEvent::Error("Error: could not access camera".into())
        ]
    );
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
}

#[tokio::test(start_paused = true)]
async fn test_camera_lost_while_scanning_reports_fixed_message() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    events.drain();

    h.camera.lose_device();
    tokio::time::sleep(Duration::from_millis(150)).await;
    rep.process_pending_events().await;

    assert_eq!(
        events.drain(),
        vec![RepresentationEvent::Error("Error: could not access camera".into())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_refused_session_falls_back_to_scanner() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    scan(&h, &mut rep, WIDGET_BARCODE).await;
    events.drain();

    h.platform
        .fail_next(XrError::PermissionDenied("camera".into()));
    assert!(!rep.select().await);

    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert!(rep.scanner().is_running());
    let events = events.drain();
    assert!(events.contains(&RepresentationEvent::Error(
        "could not enter augmented reality mode: permission denied: camera".into()
    )));
}

#[tokio::test(start_paused = true)]
async fn test_platform_exit_before_presentation_returns_to_scanner() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    scan(&h, &mut rep, WIDGET_BARCODE).await;
    assert!(rep.select().await);
    for signal in h.platform.take_signals() {
        if matches!(signal, XrSignal::SessionStarted(_)) {
            rep.handle_signal(signal).await;
        }
    }
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scene]);
    events.drain();

    h.platform.exit_presentation();
    h.pump_signals(&mut rep).await;

    assert_eq!(rep.scene().mode(), SceneMode::Inactive);
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert!(rep.scanner().is_running());
    assert_eq!(
        events.drain(),
        vec![RepresentationEvent::SurfaceChanged(Surface::Scanner)]
    );

    // The consumed candidate can be scanned and selected again
    tokio::time::advance(Duration::from_millis(600)).await;
    scan(&h, &mut rep, WIDGET_BARCODE).await;
    assert_eq!(rep.candidate(), Some(&widget()));
    assert!(rep.select().await);
    assert_eq!(h.platform.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scans_from_before_select_are_not_replayed() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    scan(&h, &mut rep, WIDGET_BARCODE).await;

    // Decoded while the user reaches for the select control
    h.camera.show_code(WIDGET_BARCODE);
    tokio::time::sleep(Duration::from_millis(150)).await;
    events.drain();

    h.platform
        .fail_next(XrError::SessionRequestFailed("busy".into()));
    assert!(!rep.select().await);

    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert_eq!(rep.candidate(), None);
    assert_eq!(candidate_updates(&events.drain()), 0);
}

#[tokio::test(start_paused = true)]
async fn test_vr_landing_falls_back_to_scanner() {
    let h = Harness::new();
    h.platform.land_in(SessionMode::ImmersiveVr);
    let (mut rep, mut events) = started(&h).await;
    enter_ar(&h, &mut rep).await;

    assert_eq!(rep.scene().mode(), SceneMode::Inactive);
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
    assert!(events
        .drain()
        .contains(&RepresentationEvent::Error("VR mode is not yet implemented".into())));
}

#[tokio::test]
async fn test_startup_fails_on_catalog_outage() {
    let h = Harness::new();
    h.api.set_outage(Some("offline"));

    let err = h.load().await.unwrap_err();
    assert!(matches!(err, RepresentationError::Catalog(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_startup_waits_for_every_dependency() {
    let mut h = Harness::new();
    h.loaders
        .push(Arc::new(InstantLoader::failing("render-runtime", "no GL context")));

    let err = h.load().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "dependency render-runtime failed to load: no GL context"
    );
    assert_eq!(h.camera.open_count(), 0);

    let h = Harness::new();
    h.load().await.unwrap();
    assert!(h.loaders.iter().all(|l| l.load_count() == 1));
}

async fn next_matching(
    events: &mut EventStream<RepresentationEvent>,
    wanted: RepresentationEvent,
) {
    let found = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = events.next().await {
            if event == wanted {
                return true;
            }
        }
        false
    })
    .await;
    assert_eq!(found, Ok(true), "never saw {wanted:?}");
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_drives_flow() {
    let h = Harness::new();
    let (mut rep, mut events) = started(&h).await;
    let (controls, mut rx) = mpsc::channel(16);
    let runner = tokio::spawn(async move {
        rep.run(&mut rx).await;
        rep
    });

    h.camera.show_code(WIDGET_BARCODE);
    next_matching(&mut events, RepresentationEvent::CandidateChanged(widget())).await;

    controls.send(Control::Select).await.unwrap();
    next_matching(&mut events, RepresentationEvent::SurfaceChanged(Surface::Scene)).await;

    for signal in h.platform.take_signals() {
        controls.send(Control::Signal(signal)).await.unwrap();
    }
    next_matching(
        &mut events,
        RepresentationEvent::SceneModeChanged(SceneMode::Placing),
    )
    .await;

    controls.send(Control::Stop).await.unwrap();
    next_matching(&mut events, RepresentationEvent::SurfaceChanged(Surface::Scanner)).await;

    controls.send(Control::Shutdown).await.unwrap();
    let rep = runner.await.unwrap();
    assert!(!rep.scanner().is_running());
    assert_eq!(rep.visible_surfaces(), vec![Surface::Scanner]);
}
