use crate::buffer::AudioBuffer;
use crate::context::{AudioContextRegistration, AudioNodeId, BaseAudioContext};
use crate::events::{EventHandler, EventType};
use crate::graph::{AudioProcessor, RenderScope};
use crate::media::{MediaElement, MediaElementStream};
use crate::Event;

use super::AudioNode;

/// Options for constructing a [`MediaElementAudioSourceNode`]
#[derive(Debug)]
pub struct MediaElementAudioSourceOptions<'a> {
    pub media_element: &'a mut MediaElement,
}

/// An audio source from a [`MediaElement`]
///
/// The node takes over the render side of the element, so a single source node can be set up
/// per element. Playback itself is controlled through the element.
///
/// # Usage
///
/// ```
/// use web_play_rec::buffer::AudioBuffer;
/// use web_play_rec::context::{BaseAudioContext, OfflineAudioContext};
/// use web_play_rec::media::MediaElement;
/// use web_play_rec::node::AudioNode;
///
/// let context = OfflineAudioContext::new(1, 128, 44_100.);
/// let mut media = MediaElement::from_buffer(AudioBuffer::from(vec![vec![0.5; 64]], 44_100.));
///
/// let src = context.create_media_element_source(&mut media);
/// src.connect(&context.destination());
/// media.play();
///
/// let output = context.start_rendering_sync();
/// assert_eq!(output.get_channel_data(0)[0], 0.5);
/// assert_eq!(output.get_channel_data(0)[64], 0.);
/// ```
#[derive(Debug)]
pub struct MediaElementAudioSourceNode {
    registration: AudioContextRegistration,
}

impl AudioNode for MediaElementAudioSourceNode {
    fn registration(&self) -> &AudioContextRegistration {
        &self.registration
    }

    fn number_of_inputs(&self) -> usize {
        0
    }

    fn number_of_outputs(&self) -> usize {
        1
    }
}

impl MediaElementAudioSourceNode {
    /// Create a new `MediaElementAudioSourceNode`
    ///
    /// # Panics
    ///
    /// This method will panic when there already exists a source node for the given
    /// `MediaElement`. You can only set up a single source node per element!
    pub fn new<C: BaseAudioContext>(
        context: &C,
        options: MediaElementAudioSourceOptions<'_>,
    ) -> Self {
        context.base().register(move |registration| {
            let stream = options
                .media_element
                .take_stream()
                .expect("InvalidStateError - stream already taken");

            let render = MediaElementRenderer {
                id: registration.id(),
                stream,
            };

            let node = MediaElementAudioSourceNode { registration };

            (node, Box::new(render))
        })
    }

    /// Register a callback to run each time the element reaches the end of its track
    ///
    /// Only a single handler is active at a time, setting a new one replaces the previous.
    pub fn set_onended<F: FnMut(Event) + Send + 'static>(&self, callback: F) {
        let callback = EventHandler::Multiple(Box::new(callback));
        self.context()
            .set_event_handler(EventType::Ended(self.registration().id()), callback);
    }

    /// Unset the callback to run when the track has ended
    pub fn clear_onended(&self) {
        self.context()
            .clear_event_handler(EventType::Ended(self.registration().id()));
    }
}

struct MediaElementRenderer {
    id: AudioNodeId,
    stream: MediaElementStream,
}

impl AudioProcessor for MediaElementRenderer {
    fn process(&mut self, _inputs: &[AudioBuffer], outputs: &mut [AudioBuffer], scope: &RenderScope) {
        // single output node
        let output = &mut outputs[0];

        if self.stream.render_quantum(scope.sample_rate, output) {
            log::debug!("media element source {:?} has ended", self.id);
            scope.send_ended_event(self.id);
        }
    }
}
