//! The `BaseAudioContext` interface

use crate::context::{AudioContextRegistration, AudioContextState, ConcreteBaseAudioContext};
use crate::media::MediaElement;
use crate::node;

/// The interface representing an audio-processing graph built from audio modules linked together,
/// each represented by an `AudioNode`.
///
/// An audio context controls both the creation of the nodes it contains and the execution of
/// the audio processing.
pub trait BaseAudioContext {
    /// Returns the [`ConcreteBaseAudioContext`] this context wraps
    fn base(&self) -> &ConcreteBaseAudioContext;

    /// Creates an `GainNode`, to control audio volume
    #[must_use]
    fn create_gain(&self) -> node::GainNode {
        node::GainNode::new(self.base(), node::GainOptions::default())
    }

    /// Creates a `StereoPannerNode` to pan a stereo output
    #[must_use]
    fn create_stereo_panner(&self) -> node::StereoPannerNode {
        node::StereoPannerNode::new(self.base(), node::StereoPannerOptions::default())
    }

    /// Creates a `MediaElementAudioSourceNode` playing the given media element
    ///
    /// # Panics
    ///
    /// This method panics when the media element is already attached to a source node
    #[must_use]
    fn create_media_element_source(
        &self,
        media_element: &mut MediaElement,
    ) -> node::MediaElementAudioSourceNode {
        let opts = node::MediaElementAudioSourceOptions { media_element };
        node::MediaElementAudioSourceNode::new(self.base(), opts)
    }

    /// Returns an `AudioDestinationNode` representing the final destination of all audio in the
    /// context. It can be thought of as the audio-rendering device.
    #[must_use]
    fn destination(&self) -> node::AudioDestinationNode {
        let registration = AudioContextRegistration {
            id: super::DESTINATION_NODE_ID,
            context: self.base().clone(),
        };
        let channel_count = self.base().max_channel_count();
        node::AudioDestinationNode::new(registration, channel_count)
    }

    /// The sample rate (in sample-frames per second) at which the `AudioContext` handles audio.
    #[must_use]
    fn sample_rate(&self) -> f32 {
        self.base().sample_rate()
    }

    /// Returns state of current context
    #[must_use]
    fn state(&self) -> AudioContextState {
        self.base().state()
    }

    /// This is the time in seconds of the sample frame immediately following the last sample-frame
    /// in the block of audio most recently processed by the context’s rendering graph.
    #[must_use]
    fn current_time(&self) -> f64 {
        self.base().current_time()
    }
}
