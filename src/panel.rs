//! The UI event loop: a queue of control events dispatched serially to the controller

use crossbeam_channel::{Receiver, Sender};

use crate::context::AudioContextOptions;
use crate::controller::PlaybackController;
use crate::media::MediaElement;
use crate::notify::{HttpNotifier, Notifier};

/// Input on the control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    /// Click on the play button
    PlayClicked,
    /// The track reached its natural end
    TrackEnded,
    /// Input on the volume slider
    VolumeInput(f32),
    /// Input on the pan slider
    PanInput(f32),
    /// Log the current state
    Status,
    /// Stop the event loop
    Quit,
}

/// Configuration of a [`Panel`] talking to a notification server over HTTP
#[derive(Clone, Debug)]
pub struct PanelConfig {
    /// Base url of the notification server, `/buttonPressed` is appended
    pub server_url: String,
    /// Options for the audio context built on the first play click
    pub context: AudioContextOptions,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            context: AudioContextOptions::default(),
        }
    }
}

/// Owns a [`PlaybackController`] and feeds it the events of its queue, one at a time
///
/// Events are posted through [`sender`](Self::sender) from any thread; the end of the track is
/// posted by the audio graph itself.
pub struct Panel<N: Notifier> {
    controller: PlaybackController<N>,
    sender: Sender<UiEvent>,
    receiver: Receiver<UiEvent>,
}

impl Panel<HttpNotifier> {
    pub fn new(element: MediaElement, config: PanelConfig) -> Self {
        let notifier = HttpNotifier::new(&config.server_url);
        Self::with_notifier(element, notifier, config.context)
    }
}

impl<N: Notifier> Panel<N> {
    pub fn with_notifier(element: MediaElement, notifier: N, options: AudioContextOptions) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();

        let controller =
            PlaybackController::new(element, notifier, options).with_ui_sender(sender.clone());

        Self {
            controller,
            sender,
            receiver,
        }
    }

    /// Handle to post events into the queue
    pub fn sender(&self) -> Sender<UiEvent> {
        self.sender.clone()
    }

    pub fn controller(&self) -> &PlaybackController<N> {
        &self.controller
    }

    /// Handle a single event, returns false when the loop should stop
    pub fn dispatch(&mut self, event: UiEvent) -> bool {
        log::debug!("Dispatching {:?}", event);

        match event {
            UiEvent::PlayClicked => {
                if let Err(e) = self.controller.on_play_click() {
                    log::error!("Unable to start audio: {}", e);
                }
            }
            UiEvent::TrackEnded => self.controller.on_track_ended(),
            UiEvent::VolumeInput(value) => self.controller.on_volume_input(value),
            UiEvent::PanInput(value) => self.controller.on_pan_input(value),
            UiEvent::Status => {
                let surface = self.controller.surface();
                let element = self.controller.element();
                log::info!(
                    "{:?} at {:.2}s/{:.2}s, volume {}, pan {}",
                    self.controller.state(),
                    element.current_time(),
                    element.duration(),
                    surface.volume().value(),
                    surface.panner().value()
                );
            }
            UiEvent::Quit => return false,
        }

        true
    }

    /// Dispatch all pending events without blocking, returns false when `Quit` was seen
    pub fn dispatch_pending(&mut self) -> bool {
        while let Ok(event) = self.receiver.try_recv() {
            if !self.dispatch(event) {
                return false;
            }
        }

        true
    }

    /// Dispatch events until `Quit` is received
    pub fn run(&mut self) {
        // the panel holds a sender itself, so the queue never disconnects
        while let Ok(event) = self.receiver.recv() {
            if !self.dispatch(event) {
                break;
            }
        }

        log::debug!("UI event loop has terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AudioBuffer;
    use crate::controller::PlaybackState;
    use crate::notify::ButtonPressed;

    struct Silent;

    impl Notifier for Silent {
        fn notify(&self, _: ButtonPressed) {}
    }

    fn panel() -> Panel<Silent> {
        let element = MediaElement::from_buffer(AudioBuffer::new(1, 128, 48_000.));
        Panel::with_notifier(element, Silent, AudioContextOptions::default())
    }

    #[test]
    fn test_slider_events_are_applied_in_order() {
        let mut panel = panel();
        let sender = panel.sender();

        sender.send(UiEvent::VolumeInput(0.25)).unwrap();
        sender.send(UiEvent::VolumeInput(0.75)).unwrap();
        sender.send(UiEvent::PanInput(-0.5)).unwrap();
        assert!(panel.dispatch_pending());

        let surface = panel.controller().surface();
        assert_eq!(surface.volume().value(), 0.75);
        assert_eq!(surface.panner().value(), -0.5);
        assert_eq!(panel.controller().state(), PlaybackState::Paused);
    }

    #[test]
    fn test_run_stops_on_quit() {
        let mut panel = panel();
        let sender = panel.sender();

        sender.send(UiEvent::TrackEnded).unwrap();
        sender.send(UiEvent::Status).unwrap();
        sender.send(UiEvent::Quit).unwrap();
        sender.send(UiEvent::VolumeInput(0.)).unwrap();
        panel.run();

        // events after quit stay queued
        assert_eq!(panel.controller().surface().volume().value(), 1.);
        assert_eq!(panel.controller().surface().data_playing(), "false");
    }
}
