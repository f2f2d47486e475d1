use super::mock::{session, session_with, Call, MockPlatform, MockUi, Recorder, RecordingCanvas};
use crate::config::SessionConfig;
use crate::session::{CanvasId, LoopState, OpenError, Session, SessionError};

#[test]
fn test_init_acquires_in_order() {
    let (_session, recorder) = session();
    assert_eq!(
        recorder.calls(),
        vec![
            Call::CreateBacking(0),
            Call::CreateContext,
            Call::MakeCurrent(Some(0)),
            Call::LoadGraphics,
            Call::SwapInterval(1),
            Call::UiInit,
        ]
    );
}

#[test]
fn test_ui_init_failure_releases_shared_objects() {
    let recorder = Recorder::default();
    recorder.fail_ui_init();
    let result = Session::new(
        SessionConfig::default(),
        MockPlatform::new(&recorder),
        MockUi::new(&recorder),
    );

    assert!(matches!(result, Err(SessionError::Ui(_))));
    assert_eq!(recorder.live_windows(), 0);
    assert_eq!(recorder.count(|c| *c == Call::DestroyContext), 1);
    recorder.assert_clean();
}

#[test]
fn test_invalid_config_is_rejected_before_any_window() {
    let recorder = Recorder::default();
    let config = SessionConfig {
        frame_interval_ms: 0,
        ..SessionConfig::default()
    };
    let result = Session::new(config, MockPlatform::new(&recorder), MockUi::new(&recorder));

    assert!(matches!(result, Err(SessionError::Config(_))));
    assert!(recorder.calls().is_empty());
}

#[test]
fn test_open_becomes_live_on_next_step() {
    let (mut session, recorder) = session();
    let id = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();

    assert!(!session.is_opened(id));
    assert_eq!(session.window_count(), 0);
    assert_eq!(session.pending_count(), 1);

    session.step();
    assert!(session.is_opened(id));
    assert_eq!(session.window_count(), 1);
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_open_creates_titled_window_and_ui_context() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("Hello triangle", &recorder)).unwrap();

    let window = recorder.window_of("Hello triangle").unwrap();
    assert_eq!(
        recorder.count(|c| matches!(c, Call::UiCreateContext { window: w, .. } if *w == window)),
        1
    );
}

#[test]
fn test_open_yields_distinct_ids() {
    let (mut session, recorder) = session();
    let a = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    let b = session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();

    assert_ne!(a, b);
    assert_ne!(a, CanvasId::default());
    assert_ne!(b, CanvasId::default());
}

#[test]
fn test_close_is_immediate_but_teardown_is_deferred() {
    let (mut session, recorder) = session();
    let id = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();
    let window = recorder.window_of("A").unwrap();

    assert!(session.close_window(id));
    assert!(!session.is_opened(id));
    assert_eq!(session.pending_count(), 1);
    assert_eq!(recorder.count(|c| *c == Call::DestroyWindow(window)), 0);

    session.step();
    assert_eq!(recorder.count(|c| *c == Call::DestroyWindow(window)), 1);
    assert_eq!(recorder.count(|c| *c == Call::Dropped("A".to_string())), 1);
    assert_eq!(session.pending_count(), 0);
    recorder.assert_clean();
}

#[test]
fn test_close_null_id_is_rejected() {
    let (mut session, _recorder) = session();
    assert!(!session.close_window(CanvasId::default()));
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn test_close_of_pending_canvas_is_rejected() {
    let (mut session, recorder) = session();
    let id = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();

    assert!(!session.close_window(id));
    session.step();
    assert!(session.is_opened(id));
}

#[test]
fn test_close_twice_is_rejected() {
    let (mut session, recorder) = session();
    let id = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();

    assert!(session.close_window(id));
    assert!(!session.close_window(id));
    session.step();
    assert!(!session.close_window(id));
    assert_eq!(recorder.count(|c| *c == Call::Release("A".to_string())), 1);
}

#[test]
fn test_window_failure_queues_nothing() {
    let (mut session, recorder) = session();
    recorder.fail_next_window();

    let result = session.open_window(RecordingCanvas::new("A", &recorder));
    assert!(matches!(result, Err(OpenError::Window(_))));
    assert_eq!(session.pending_count(), 0);
    assert_eq!(recorder.count(|c| matches!(c, Call::UiCreateContext { .. })), 0);
    assert_eq!(recorder.count(|c| *c == Call::Dropped("A".to_string())), 1);
}

#[test]
fn test_ui_context_failure_destroys_window() {
    let (mut session, recorder) = session();
    recorder.fail_next_ui_context();

    let result = session.open_window(RecordingCanvas::new("A", &recorder));
    assert!(matches!(result, Err(OpenError::UiContext(_))));

    let window = recorder.window_of("A").unwrap();
    assert_eq!(recorder.count(|c| *c == Call::DestroyWindow(window)), 1);
    assert_eq!(session.pending_count(), 0);
    assert_eq!(recorder.live_windows(), 1);
    recorder.assert_clean();

    // Failure is not sticky
    assert!(session.open_window(RecordingCanvas::new("B", &recorder)).is_ok());
}

#[test]
fn test_teardown_releases_with_window_current() {
    let (mut session, recorder) = session();
    let id = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();
    let window = recorder.window_of("A").unwrap();

    session.close_window(id);
    recorder.clear();
    session.step();

    let calls = recorder.calls();
    let release = recorder.position(&Call::Release("A".to_string())).unwrap();
    let ui_destroy = recorder.position(&Call::UiDestroyContext(0)).unwrap();
    let destroy = recorder.position(&Call::DestroyWindow(window)).unwrap();

    assert_eq!(calls[release - 1], Call::MakeCurrent(Some(window)));
    assert!(release < ui_destroy);
    assert!(ui_destroy < destroy);
    assert_eq!(calls[destroy - 1], Call::MakeCurrent(None));
    recorder.assert_clean();
}

#[test]
fn test_close_all_drains_every_queue() {
    let (mut session, recorder) = session();
    let live = session.open_window(RecordingCanvas::new("Live", &recorder)).unwrap();
    let closing = session.open_window(RecordingCanvas::new("Closing", &recorder)).unwrap();
    session.step();
    session.close_window(closing);
    session.open_window(RecordingCanvas::new("Pending", &recorder)).unwrap();

    session.close_all_windows();

    assert!(!session.is_opened(live));
    assert_eq!(session.window_count(), 0);
    assert_eq!(session.pending_count(), 0);
    for title in ["Live", "Closing", "Pending"] {
        assert_eq!(recorder.count(|c| *c == Call::Release(title.to_string())), 1);
        assert_eq!(recorder.count(|c| *c == Call::Dropped(title.to_string())), 1);
    }
    assert_eq!(recorder.live_windows(), 1);
    assert_eq!(recorder.live_ui_contexts(), 0);
    recorder.assert_clean();
}

#[test]
fn test_shutdown_releases_in_reverse_order() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();
    session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();

    session.shutdown();

    let calls = recorder.calls();
    let last_ui_destroy = calls
        .iter()
        .rposition(|c| matches!(c, Call::UiDestroyContext(_)))
        .unwrap();
    let ui_shutdown = recorder.position(&Call::UiShutdown).unwrap();
    let context = recorder.position(&Call::DestroyContext).unwrap();
    let backing = recorder.position(&Call::DestroyWindow(0)).unwrap();

    assert!(last_ui_destroy < ui_shutdown);
    assert_eq!(calls[ui_shutdown - 1], Call::MakeCurrent(Some(0)));
    assert_eq!(calls[context - 1], Call::MakeCurrent(None));
    assert!(ui_shutdown < context);
    assert_eq!(backing, calls.len() - 1);

    assert_eq!(recorder.count(|c| matches!(c, Call::DestroyWindow(_))), 3);
    assert_eq!(recorder.count(|c| matches!(c, Call::Dropped(_))), 2);
    assert_eq!(recorder.live_windows(), 0);
    assert_eq!(recorder.live_ui_contexts(), 0);
    recorder.assert_clean();
}

#[test]
fn test_every_object_destroyed_exactly_once() {
    let (mut session, recorder) = session();
    let a = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    let b = session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();
    for _ in 0..3 {
        super::mock::frame(&mut session, &recorder);
    }
    session.close_window(a);
    super::mock::frame(&mut session, &recorder);
    session.close_window(b);
    session.step();
    assert_eq!(session.state(), LoopState::Terminating);
    session.shutdown();

    for title in ["A", "B"] {
        assert_eq!(recorder.count(|c| *c == Call::Release(title.to_string())), 1);
        assert_eq!(recorder.count(|c| *c == Call::Dropped(title.to_string())), 1);
    }
    assert_eq!(recorder.count(|c| matches!(c, Call::UiDestroyContext(_))), 2);
    assert_eq!(recorder.count(|c| matches!(c, Call::DestroyWindow(_))), 3);
    assert_eq!(recorder.count(|c| *c == Call::DestroyContext), 1);
    assert_eq!(recorder.count(|c| *c == Call::UiShutdown), 1);
    recorder.assert_clean();
}

#[test]
fn test_exec_runs_until_quit_then_shuts_down() {
    let config = SessionConfig {
        quit_when_last_window_closes: false,
        ..SessionConfig::default()
    };
    let (mut session, recorder) = session_with(config);
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    recorder.push_event(super::mock::MockEvent::Quit);

    session.exec();

    assert_eq!(recorder.count(|c| *c == Call::Dropped("A".to_string())), 1);
    assert_eq!(recorder.live_windows(), 0);
    recorder.assert_clean();
}
