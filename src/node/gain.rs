use crate::buffer::AudioBuffer;
use crate::context::{AudioContextRegistration, BaseAudioContext};
use crate::graph::{AudioProcessor, RenderScope};
use crate::param::{AudioParam, AudioParamDescriptor, AudioParamProcessor};

use super::AudioNode;

/// Options for constructing a [`GainNode`]
#[derive(Clone, Debug)]
pub struct GainOptions {
    pub gain: f32,
}

impl Default for GainOptions {
    fn default() -> Self {
        Self { gain: 1. }
    }
}

/// AudioNode for volume control
///
/// Every sample of the input is multiplied by the current value of the [`gain`](Self::gain)
/// parameter.
#[derive(Debug)]
pub struct GainNode {
    registration: AudioContextRegistration,
    gain: AudioParam,
}

impl AudioNode for GainNode {
    fn registration(&self) -> &AudioContextRegistration {
        &self.registration
    }

    fn number_of_inputs(&self) -> usize {
        1
    }

    fn number_of_outputs(&self) -> usize {
        1
    }
}

impl GainNode {
    pub fn new<C: BaseAudioContext>(context: &C, options: GainOptions) -> Self {
        context.base().register(move |registration| {
            let param_opts = AudioParamDescriptor {
                min_value: f32::MIN,
                max_value: f32::MAX,
                default_value: 1.,
            };
            let (param, proc) = AudioParam::new(param_opts);

            param.set_value(options.gain);

            let render = GainRenderer { gain: proc };

            let node = GainNode {
                registration,
                gain: param,
            };

            (node, Box::new(render))
        })
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }
}

struct GainRenderer {
    gain: AudioParamProcessor,
}

impl AudioProcessor for GainRenderer {
    fn process(&mut self, inputs: &[AudioBuffer], outputs: &mut [AudioBuffer], _: &RenderScope) {
        // single input/output node
        let input = &inputs[0];
        let output = &mut outputs[0];

        *output = input.clone();

        let gain = self.gain.value();
        if gain == 1. {
            return;
        }

        output
            .channels_mut()
            .iter_mut()
            .for_each(|channel| channel.iter_mut().for_each(|value| *value *= gain));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OfflineAudioContext;
    use crate::media::MediaElement;
    use float_eq::assert_float_eq;

    #[test]
    fn test_default() {
        let context = OfflineAudioContext::new(1, 128, 44_100.);
        let gain = context.create_gain();

        assert_float_eq!(gain.gain().value(), 1., abs <= 0.);
    }

    #[test]
    fn test_set_gain() {
        let context = OfflineAudioContext::new(1, 128, 44_100.);
        let gain = GainNode::new(&context, GainOptions { gain: 0.25 });
        assert_float_eq!(gain.gain().value(), 0.25, abs <= 0.);

        gain.gain().set_value(0.5);
        assert_float_eq!(gain.gain().value(), 0.5, abs <= 0.);
    }

    #[test]
    fn test_gain_scales_signal() {
        let sample_rate = 44_100.;
        let context = OfflineAudioContext::new(1, 128, sample_rate);

        let buffer = AudioBuffer::from(vec![vec![1.; 128]], sample_rate);
        let mut element = MediaElement::from_buffer(buffer);
        let src = context.create_media_element_source(&mut element);
        element.play();

        let gain = context.create_gain();
        gain.gain().set_value(0.5);

        src.connect(&gain).connect(&context.destination());

        let output = context.start_rendering_sync();
        assert_float_eq!(
            output.get_channel_data(0),
            &[0.5; 128][..],
            abs_all <= 0.
        );
    }
}
