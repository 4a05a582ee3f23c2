//! Binding of the play button and the volume/pan sliders to the audio graph

use crossbeam_channel::Sender;

use crate::context::{
    AudioContext, AudioContextOptions, AudioContextState, BackendError, BaseAudioContext,
};
use crate::media::MediaElement;
use crate::node::{AudioNode, GainNode, MediaElementAudioSourceNode, StereoPannerNode};
use crate::notify::{ButtonPressed, Notifier};
use crate::panel::UiEvent;

/// Playback state as shown by the play button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

impl PlaybackState {
    fn as_attribute(self) -> &'static str {
        match self {
            Self::Playing => "true",
            Self::Paused => "false",
        }
    }
}

/// Id of the volume slider, also its `data-action`
pub const VOLUME_SLIDER_ID: &str = "volume";
/// Id of the pan slider, also its `data-action`
pub const PAN_SLIDER_ID: &str = "panner";

/// A range input: the value is clamped to `[min, max]` on every update
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    id: &'static str,
    value: f32,
    min: f32,
    max: f32,
}

impl Slider {
    fn new(id: &'static str, value: f32, min: f32, max: f32) -> Self {
        Self { id, value, min, max }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    fn set_value(&mut self, value: f32) {
        // a NaN input leaves the slider where it was
        if !value.is_nan() {
            self.value = value.clamp(self.min, self.max);
        }
    }
}

/// The controls of the player: the play button attributes and the two sliders
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSurface {
    data_playing: &'static str,
    aria_checked: &'static str,
    volume: Slider,
    panner: Slider,
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self {
            data_playing: "false",
            aria_checked: "false",
            volume: Slider::new(VOLUME_SLIDER_ID, 1., 0., 2.),
            panner: Slider::new(PAN_SLIDER_ID, 0., -1., 1.),
        }
    }
}

impl ControlSurface {
    /// The `data-playing` attribute of the play button
    pub fn data_playing(&self) -> &str {
        self.data_playing
    }

    /// The `aria-checked` attribute of the play button
    pub fn aria_checked(&self) -> &str {
        self.aria_checked
    }

    pub fn volume(&self) -> &Slider {
        &self.volume
    }

    pub fn panner(&self) -> &Slider {
        &self.panner
    }

    /// Look up a slider by its id
    pub fn slider(&self, id: &str) -> Option<&Slider> {
        match id {
            VOLUME_SLIDER_ID => Some(&self.volume),
            PAN_SLIDER_ID => Some(&self.panner),
            _ => None,
        }
    }

    fn show(&mut self, state: PlaybackState) {
        self.data_playing = state.as_attribute();
        self.aria_checked = state.as_attribute();
    }
}

/// The `source -> gain -> panner -> destination` chain
#[derive(Debug)]
pub struct AudioGraph {
    context: AudioContext,
    source: MediaElementAudioSourceNode,
    gain: GainNode,
    panner: StereoPannerNode,
}

impl AudioGraph {
    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    pub fn source(&self) -> &MediaElementAudioSourceNode {
        &self.source
    }

    pub fn gain(&self) -> &GainNode {
        &self.gain
    }

    pub fn panner(&self) -> &StereoPannerNode {
        &self.panner
    }
}

/// Binds the play button and the sliders to an audio graph and a [`Notifier`]
///
/// The audio graph is built on the first play click, the context is resumed on every click that
/// finds it suspended (autoplay policy). Every toggle reports the slider values to the notifier.
///
/// The end of the track reaches the controller as [`UiEvent::TrackEnded`] on the sender given
/// to [`with_ui_sender`](Self::with_ui_sender), see [`Panel`](crate::panel::Panel).
pub struct PlaybackController<N: Notifier> {
    state: PlaybackState,
    surface: ControlSurface,
    element: MediaElement,
    graph: Option<AudioGraph>,
    notifier: N,
    options: AudioContextOptions,
    ui_sender: Option<Sender<UiEvent>>,
}

impl<N: Notifier> std::fmt::Debug for PlaybackController<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("surface", &self.surface)
            .field("element", &self.element)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl<N: Notifier> PlaybackController<N> {
    pub fn new(element: MediaElement, notifier: N, options: AudioContextOptions) -> Self {
        Self {
            state: PlaybackState::Paused,
            surface: ControlSurface::default(),
            element,
            graph: None,
            notifier,
            options,
            ui_sender: None,
        }
    }

    /// Forward the end of the track to the given UI queue
    #[must_use]
    pub fn with_ui_sender(mut self, sender: Sender<UiEvent>) -> Self {
        self.ui_sender = Some(sender);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// The audio graph, `None` until the first play click
    pub fn graph(&self) -> Option<&AudioGraph> {
        self.graph.as_ref()
    }

    pub fn element(&self) -> &MediaElement {
        &self.element
    }

    /// Handle a click on the play button
    ///
    /// # Errors
    ///
    /// Returns an error when the audio context cannot be created on the first click. The state
    /// is left untouched and the next click retries.
    pub fn on_play_click(&mut self) -> Result<PlaybackState, BackendError> {
        if self.graph.is_none() {
            self.graph = Some(self.build_graph()?);
        }

        if let Some(graph) = self.graph.as_ref() {
            if graph.context.state() == AudioContextState::Suspended {
                graph.context.resume();
            }
        }

        self.state = match self.state {
            PlaybackState::Paused => {
                self.element.play();
                PlaybackState::Playing
            }
            PlaybackState::Playing => {
                self.element.pause();
                PlaybackState::Paused
            }
        };
        self.surface.show(self.state);

        log::debug!("Play button toggled to {:?}", self.state);

        self.notify_server(self.surface.panner.value(), self.surface.volume.value());

        Ok(self.state)
    }

    /// Handle the natural end of the track
    pub fn on_track_ended(&mut self) {
        log::debug!("Track ended");

        self.element.pause();
        self.state = PlaybackState::Paused;
        self.surface.show(self.state);
    }

    /// Handle input on the volume slider
    pub fn on_volume_input(&mut self, value: f32) {
        self.surface.volume.set_value(value);

        if let Some(graph) = self.graph.as_ref() {
            graph.gain.gain().set_value(self.surface.volume.value());
        }
    }

    /// Handle input on the pan slider
    pub fn on_pan_input(&mut self, value: f32) {
        self.surface.panner.set_value(value);

        if let Some(graph) = self.graph.as_ref() {
            graph.panner.pan().set_value(self.surface.panner.value());
        }
    }

    /// Report the slider values, without waiting for the outcome
    pub fn notify_server(&self, pan: f32, volume: f32) {
        self.notifier.notify(ButtonPressed { pan, volume });
    }

    fn build_graph(&mut self) -> Result<AudioGraph, BackendError> {
        let context = AudioContext::new(self.options.clone())?;

        let source = context.create_media_element_source(&mut self.element);

        let gain = context.create_gain();
        gain.gain().set_value(self.surface.volume.value());

        let panner = context.create_stereo_panner();
        panner.pan().set_value(self.surface.panner.value());

        source
            .connect(&gain)
            .connect(&panner)
            .connect(&context.destination());

        match self.ui_sender.clone() {
            Some(sender) => source.set_onended(move |_| {
                if sender.send(UiEvent::TrackEnded).is_err() {
                    log::warn!("Discarding track end - UI event loop is gone");
                }
            }),
            None => source.set_onended(|_| log::debug!("Track ended, no UI event loop attached")),
        }

        log::info!("Audio graph constructed on sink {:?}", context.sink_id());

        Ok(AudioGraph {
            context,
            source,
            gain,
            panner,
        })
    }
}
