use super::mock::{frame, session, Call, RecordingCanvas};
use crate::session::LoopState;

fn renders(recorder: &super::mock::Recorder, title: &str) -> usize {
    recorder.count(|c| *c == Call::Render(title.to_string()))
}

#[test]
fn test_no_render_before_deadline() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();

    session.step();
    recorder.advance_ms(16);
    session.step();
    assert_eq!(renders(&recorder, "A"), 0);

    recorder.advance_ms(1);
    session.step();
    assert_eq!(renders(&recorder, "A"), 1);
}

#[test]
fn test_frame_call_order() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();
    let window = recorder.window_of("A").unwrap();

    recorder.clear();
    frame(&mut session, &recorder);

    assert_eq!(
        recorder.calls(),
        vec![
            Call::NewFrame(0),
            Call::BuildUi("A".to_string()),
            Call::EndFrame(0),
            Call::MakeCurrent(Some(window)),
            Call::Render("A".to_string()),
            Call::Submit(window),
            Call::Swap(window),
            Call::Suspend(0),
        ]
    );
    recorder.assert_clean();
}

#[test]
fn test_late_clock_is_caught_up_one_tick_per_step() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();

    // Deadlines at 16, 32, 48, 64, 80 and 96 ms are all behind 100 ms
    recorder.advance_ms(100);
    for _ in 0..10 {
        session.step();
    }
    assert_eq!(renders(&recorder, "A"), 6);

    recorder.advance_ms(12);
    session.step();
    assert_eq!(renders(&recorder, "A"), 6);
    recorder.advance_ms(1);
    session.step();
    assert_eq!(renders(&recorder, "A"), 7);
}

#[test]
fn test_every_live_canvas_renders_each_tick() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.open_window(RecordingCanvas::new("B", &recorder)).unwrap();

    for _ in 0..4 {
        frame(&mut session, &recorder);
    }

    assert_eq!(renders(&recorder, "A"), 4);
    assert_eq!(renders(&recorder, "B"), 4);
    assert_eq!(recorder.count(|c| matches!(c, Call::Swap(_))), 8);
    recorder.assert_clean();
}

#[test]
fn test_terminating_session_does_not_render() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.request_quit();

    frame(&mut session, &recorder);
    assert_eq!(session.state(), LoopState::Terminating);
    assert_eq!(renders(&recorder, "A"), 0);
}

#[test]
fn test_failed_ui_submit_still_swaps() {
    let (mut session, recorder) = session();
    session.open_window(RecordingCanvas::new("A", &recorder)).unwrap();
    session.step();
    let window = recorder.window_of("A").unwrap();
    recorder.fail_submit(true);

    for _ in 0..3 {
        frame(&mut session, &recorder);
    }
    assert_eq!(recorder.count(|c| *c == Call::Submit(window)), 3);
    assert_eq!(recorder.count(|c| *c == Call::Swap(window)), 3);
    assert_eq!(renders(&recorder, "A"), 3);
    assert_eq!(session.state(), LoopState::Running);

    recorder.fail_submit(false);
    frame(&mut session, &recorder);
    assert_eq!(recorder.count(|c| *c == Call::Swap(window)), 4);
    recorder.assert_clean();
}
