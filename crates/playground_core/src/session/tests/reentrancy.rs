use super::mock::{frame, id_cell, session, Call, RecordingCanvas};
use crate::session::{LoopState, OpenError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_canvas_opens_another_during_build_ui() {
    let (mut session, recorder) = session();
    let opened = id_cell();

    let script_recorder = recorder.clone();
    let script_opened = opened.clone();
    session
        .open_window(RecordingCanvas::scripted("A", &recorder, move |session| {
            if script_opened.get() == Default::default() {
                let id = session
                    .open_window(RecordingCanvas::new("B", &script_recorder))
                    .unwrap();
                script_opened.set(id);
            }
        }))
        .unwrap();

    frame(&mut session, &recorder);
    let b = opened.get();
    assert!(!session.is_opened(b));
    assert_eq!(session.pending_count(), 1);
    assert_eq!(recorder.count(|c| *c == Call::Render("A".to_string())), 1);
    assert_eq!(recorder.count(|c| *c == Call::BuildUi("B".to_string())), 0);

    frame(&mut session, &recorder);
    assert!(session.is_opened(b));
    assert_eq!(recorder.count(|c| *c == Call::Render("B".to_string())), 1);
    recorder.assert_clean();
}

#[test]
fn test_canvas_closes_itself_during_build_ui() {
    let (mut session, recorder) = session();
    let own = id_cell();

    let script_own = own.clone();
    let id = session
        .open_window(RecordingCanvas::scripted("A", &recorder, move |session| {
            assert!(session.close_window(script_own.get()));
        }))
        .unwrap();
    own.set(id);

    frame(&mut session, &recorder);
    assert!(!session.is_opened(id));
    assert_eq!(recorder.count(|c| *c == Call::BuildUi("A".to_string())), 1);
    assert_eq!(recorder.count(|c| *c == Call::Render("A".to_string())), 0);
    assert_eq!(recorder.count(|c| matches!(c, Call::Suspend(0))), 1);

    session.step();
    assert_eq!(recorder.count(|c| *c == Call::Release("A".to_string())), 1);
    assert_eq!(recorder.count(|c| *c == Call::UiDestroyContext(0)), 1);
    assert_eq!(recorder.count(|c| *c == Call::Dropped("A".to_string())), 1);
    assert_eq!(session.state(), LoopState::Terminating);
    recorder.assert_clean();
}

#[test]
fn test_canvas_closes_sibling_during_build_ui() {
    let (mut session, recorder) = session();
    let sibling = id_cell();

    let script_sibling = sibling.clone();
    let closer = session
        .open_window(RecordingCanvas::scripted("Closer", &recorder, move |session| {
            session.close_window(script_sibling.get());
        }))
        .unwrap();
    let target = session.open_window(RecordingCanvas::new("Target", &recorder)).unwrap();
    sibling.set(target);

    frame(&mut session, &recorder);
    assert!(session.is_opened(closer));
    assert!(!session.is_opened(target));
    // Target renders only if it came before Closer in the tick
    assert!(recorder.count(|c| *c == Call::Render("Target".to_string())) <= 1);

    frame(&mut session, &recorder);
    assert_eq!(recorder.count(|c| *c == Call::Release("Target".to_string())), 1);
    assert_eq!(recorder.count(|c| *c == Call::Render("Closer".to_string())), 2);
    recorder.assert_clean();
}

#[test]
fn test_open_failure_during_build_ui_is_reported_to_canvas() {
    let (mut session, recorder) = session();
    let outcome: Rc<RefCell<Option<bool>>> = Rc::default();

    let script_recorder = recorder.clone();
    let script_outcome = outcome.clone();
    session
        .open_window(RecordingCanvas::scripted("A", &recorder, move |session| {
            if script_outcome.borrow().is_none() {
                script_recorder.fail_next_window();
                let result = session.open_window(RecordingCanvas::new("B", &script_recorder));
                *script_outcome.borrow_mut() = Some(matches!(result, Err(OpenError::Window(_))));
            }
        }))
        .unwrap();

    frame(&mut session, &recorder);
    assert_eq!(*outcome.borrow(), Some(true));
    assert_eq!(session.pending_count(), 0);
    assert_eq!(recorder.count(|c| *c == Call::Render("A".to_string())), 1);
    recorder.assert_clean();
}

#[test]
fn test_close_all_during_build_ui_releases_lent_canvas_once() {
    let (mut session, recorder) = session();
    let fired = Rc::new(Cell::new(false));

    let script_fired = fired.clone();
    session
        .open_window(RecordingCanvas::scripted("A", &recorder, move |session| {
            if !script_fired.replace(true) {
                session.close_all_windows();
            }
        }))
        .unwrap();
    session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();

    frame(&mut session, &recorder);
    assert!(fired.get());
    assert_eq!(session.window_count(), 0);
    for title in ["A", "B"] {
        assert_eq!(recorder.count(|c| *c == Call::Release(title.to_string())), 1);
        assert_eq!(recorder.count(|c| *c == Call::Dropped(title.to_string())), 1);
    }
    assert_eq!(recorder.live_ui_contexts(), 0);
    assert_eq!(recorder.count(|c| *c == Call::Render("A".to_string())), 0);

    assert_eq!(session.step(), LoopState::Terminating);
    recorder.assert_clean();
}
