use crate::buffer::AudioBuffer;
use crate::context::AudioContextRegistration;
use crate::graph::{AudioProcessor, RenderScope};

use super::AudioNode;

/// Representing the final audio destination and is what the user will ultimately hear.
#[derive(Debug)]
pub struct AudioDestinationNode {
    registration: AudioContextRegistration,
    channel_count: usize,
}

impl AudioNode for AudioDestinationNode {
    fn registration(&self) -> &AudioContextRegistration {
        &self.registration
    }

    fn number_of_inputs(&self) -> usize {
        1
    }

    fn number_of_outputs(&self) -> usize {
        1 // the graph reads the rendered signal from here
    }
}

impl AudioDestinationNode {
    /// The destination is created together with the render thread, this only builds the handle
    pub(crate) fn new(registration: AudioContextRegistration, channel_count: usize) -> Self {
        Self {
            registration,
            channel_count,
        }
    }

    /// The maximum number of channels that the output device can play
    pub fn max_channel_count(&self) -> usize {
        self.channel_count
    }
}

pub(crate) struct DestinationRenderer {}

impl AudioProcessor for DestinationRenderer {
    fn process(&mut self, inputs: &[AudioBuffer], outputs: &mut [AudioBuffer], _: &RenderScope) {
        // single input/output node
        let input = &inputs[0];
        let output = &mut outputs[0];

        *output = input.clone();
    }
}
