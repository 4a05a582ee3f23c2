//! Play button and slider behavior of the `PlaybackController`, rendered on the 'none' backend

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use web_play_rec::buffer::AudioBuffer;
use web_play_rec::context::{AudioContextOptions, AudioContextState, BaseAudioContext};
use web_play_rec::controller::{PlaybackController, PlaybackState};
use web_play_rec::media::MediaElement;
use web_play_rec::notify::{ButtonPressed, Notifier};
use web_play_rec::panel::{Panel, UiEvent};

/// Records every notification instead of posting it
#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ButtonPressed>>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<ButtonPressed> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, payload: ButtonPressed) {
        self.sent.lock().unwrap().push(payload);
    }
}

fn none_options() -> AudioContextOptions {
    AudioContextOptions {
        sink_id: "none".into(),
        ..AudioContextOptions::default()
    }
}

/// One second of a constant signal
fn long_track() -> MediaElement {
    MediaElement::from_buffer(AudioBuffer::from(vec![vec![0.25; 48_000]], 48_000.))
}

fn controller() -> (PlaybackController<RecordingNotifier>, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let controller = PlaybackController::new(long_track(), notifier.clone(), none_options());
    (controller, notifier)
}

#[test]
fn test_initial_state() {
    let (controller, notifier) = controller();

    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(controller.surface().data_playing(), "false");
    assert_eq!(controller.surface().aria_checked(), "false");
    assert_eq!(controller.surface().volume().value(), 1.);
    assert_eq!(controller.surface().panner().value(), 0.);
    assert!(controller.graph().is_none());
    assert!(controller.element().paused());
    assert!(notifier.sent().is_empty());
}

#[test]
fn test_play_click_toggles() {
    let (mut controller, _) = controller();

    let state = controller.on_play_click().unwrap();
    assert_eq!(state, PlaybackState::Playing);
    assert_eq!(controller.surface().data_playing(), "true");
    assert_eq!(controller.surface().aria_checked(), "true");
    assert!(!controller.element().paused());

    let state = controller.on_play_click().unwrap();
    assert_eq!(state, PlaybackState::Paused);
    assert_eq!(controller.surface().data_playing(), "false");
    assert_eq!(controller.surface().aria_checked(), "false");
    assert!(controller.element().paused());
}

#[test]
fn test_first_click_resumes_context() {
    let (mut controller, _) = controller();

    controller.on_play_click().unwrap();
    let context = controller.graph().unwrap().context();
    assert_eq!(context.state(), AudioContextState::Running);
}

#[test]
fn test_graph_is_built_once() {
    let (mut controller, _) = controller();

    controller.on_play_click().unwrap();
    let base = controller.graph().unwrap().context().base().clone();

    controller.on_play_click().unwrap();
    controller.on_play_click().unwrap();
    assert!(controller.graph().unwrap().context().base() == &base);
}

#[test]
fn test_every_toggle_notifies_once() {
    let (mut controller, notifier) = controller();

    controller.on_volume_input(0.5);
    controller.on_pan_input(-0.25);
    assert!(notifier.sent().is_empty());

    controller.on_play_click().unwrap();
    controller.on_pan_input(1.);
    controller.on_play_click().unwrap();

    assert_eq!(
        notifier.sent(),
        vec![
            ButtonPressed {
                pan: -0.25,
                volume: 0.5
            },
            ButtonPressed {
                pan: 1.,
                volume: 0.5
            },
        ]
    );
}

#[test]
fn test_volume_input_sets_gain() {
    let (mut controller, notifier) = controller();
    controller.on_play_click().unwrap();

    controller.on_volume_input(0.5);
    assert_eq!(controller.graph().unwrap().gain().gain().value(), 0.5);
    assert_eq!(controller.surface().volume().value(), 0.5);

    // no other side effects
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(controller.surface().data_playing(), "true");
    assert_eq!(notifier.sent().len(), 1);
}

#[test]
fn test_pan_input_sets_panner() {
    let (mut controller, _) = controller();
    controller.on_play_click().unwrap();

    controller.on_pan_input(-1.);
    assert_eq!(controller.graph().unwrap().panner().pan().value(), -1.);
}

#[test]
fn test_slider_input_before_graph() {
    let (mut controller, _) = controller();

    controller.on_volume_input(1.5);
    controller.on_pan_input(0.75);
    assert!(controller.graph().is_none());

    controller.on_play_click().unwrap();
    let graph = controller.graph().unwrap();
    assert_eq!(graph.gain().gain().value(), 1.5);
    assert_eq!(graph.panner().pan().value(), 0.75);
}

#[test]
fn test_slider_input_is_clamped() {
    let (mut controller, _) = controller();
    controller.on_play_click().unwrap();

    controller.on_volume_input(5.);
    controller.on_pan_input(-3.);
    assert_eq!(controller.surface().volume().value(), 2.);
    assert_eq!(controller.graph().unwrap().gain().gain().value(), 2.);
    assert_eq!(controller.graph().unwrap().panner().pan().value(), -1.);
}

#[test]
fn test_track_ended_forces_paused() {
    let (mut controller, _) = controller();

    // regardless of prior state
    controller.on_track_ended();
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(controller.surface().data_playing(), "false");
    assert_eq!(controller.surface().aria_checked(), "false");

    controller.on_play_click().unwrap();
    controller.on_track_ended();
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(controller.surface().data_playing(), "false");
    assert_eq!(controller.surface().aria_checked(), "false");
    assert!(controller.element().paused());

    // the graph stays in place
    assert!(controller.graph().is_some());
}

#[test]
fn test_natural_end_reaches_the_panel() {
    // 20 ms of audio
    let element = MediaElement::from_buffer(AudioBuffer::from(vec![vec![0.25; 960]], 48_000.));
    let notifier = RecordingNotifier::default();
    let mut panel = Panel::with_notifier(element, notifier.clone(), none_options());

    panel.sender().send(UiEvent::PlayClicked).unwrap();
    assert!(panel.dispatch_pending());
    assert_eq!(panel.controller().state(), PlaybackState::Playing);

    let start = Instant::now();
    while panel.controller().state() == PlaybackState::Playing
        && start.elapsed() < Duration::from_secs(5)
    {
        std::thread::sleep(Duration::from_millis(10));
        assert!(panel.dispatch_pending());
    }

    assert_eq!(panel.controller().state(), PlaybackState::Paused);
    assert_eq!(panel.controller().surface().data_playing(), "false");
    assert_eq!(panel.controller().surface().aria_checked(), "false");
    assert!(panel.controller().element().ended());

    // the end of the track is not a button press
    assert_eq!(notifier.sent().len(), 1);

    // playing again restarts the track
    panel.sender().send(UiEvent::PlayClicked).unwrap();
    assert!(panel.dispatch_pending());
    assert_eq!(panel.controller().state(), PlaybackState::Playing);
    assert!(!panel.controller().element().ended());
    assert_eq!(notifier.sent().len(), 2);
}
