use super::mock::{frame, session, session_with, Call, MockEvent, RecordingCanvas};
use crate::config::SessionConfig;
use crate::session::LoopState;

fn keep_running() -> SessionConfig {
    SessionConfig {
        quit_when_last_window_closes: false,
        ..SessionConfig::default()
    }
}

#[test]
fn test_input_reaches_only_its_window_context() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();
    session.step();
    let a = recorder.window_of("A").unwrap();
    let b = recorder.window_of("B").unwrap();

    recorder.push_event(MockEvent::Input(a));
    recorder.push_event(MockEvent::Input(a));
    session.step();

    assert_eq!(recorder.count(|c| matches!(c, Call::UiEvent { window, .. } if *window == a)), 2);
    assert_eq!(recorder.count(|c| matches!(c, Call::UiEvent { window, .. } if *window == b)), 0);
}

#[test]
fn test_close_request_closes_owning_canvas() {
    let (mut session, recorder) = session_with(keep_running());
    let a = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    let b = session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();
    session.step();

    recorder.push_event(MockEvent::Close(recorder.window_of("A").unwrap()));
    frame(&mut session, &recorder);

    assert!(!session.is_opened(a));
    assert!(session.is_opened(b));
    assert_eq!(recorder.count(|c| *c == Call::Render("A".to_string())), 0);
    assert_eq!(recorder.count(|c| *c == Call::Render("B".to_string())), 1);

    session.step();
    assert_eq!(recorder.count(|c| *c == Call::Dropped("A".to_string())), 1);
    recorder.assert_clean();
}

#[test]
fn test_close_request_for_unknown_window_is_ignored() {
    let (mut session, recorder) = session();
    let a = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();

    recorder.push_event(MockEvent::Close(99));
    session.step();
    assert!(session.is_opened(a));
    assert_eq!(session.state(), LoopState::Running);
}

#[test]
fn test_quit_event_terminates() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();

    recorder.push_event(MockEvent::Quit);
    assert_eq!(session.step(), LoopState::Terminating);
}

#[test]
fn test_closing_last_window_terminates() {
    let (mut session, recorder) = session();
    let a = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();
    assert_eq!(session.state(), LoopState::Running);

    session.close_window(a);
    assert_eq!(session.step(), LoopState::Terminating);
}

#[test]
fn test_closing_last_window_can_keep_running() {
    let (mut session, recorder) = session_with(keep_running());
    let a = session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();

    session.close_window(a);
    assert_eq!(session.step(), LoopState::Running);
    assert_eq!(session.window_count(), 0);
}

#[test]
fn test_empty_session_terminates_on_first_step() {
    let (mut session, _recorder) = session();
    assert_eq!(session.step(), LoopState::Terminating);
}
