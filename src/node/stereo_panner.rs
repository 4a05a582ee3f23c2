//! The stereo panner control and renderer parts
use std::f32::consts::FRAC_PI_2;

use crate::buffer::AudioBuffer;
use crate::context::{AudioContextRegistration, BaseAudioContext};
use crate::graph::{AudioProcessor, RenderScope};
use crate::param::{AudioParam, AudioParamDescriptor, AudioParamProcessor};

use super::AudioNode;

/// Options for constructing a [`StereoPannerNode`]
#[derive(Clone, Debug, Default)]
pub struct StereoPannerOptions {
    /// initial value for the pan parameter
    pub pan: f32,
}

/// Generates the stereo gains for a specific x ∈ [0, 1] derived from pan.
///
/// - `gain_left = (x * PI / 2.).cos()`
/// - `gain_right = (x * PI / 2.).sin()`
#[inline(always)]
fn get_stereo_gains(x: f32) -> [f32; 2] {
    let angle = x * FRAC_PI_2;
    [angle.cos(), angle.sin()]
}

/// `StereoPannerNode` positions an incoming audio stream in a stereo image
///
/// It is an audio-processing module that positions an incoming audio stream
/// in a stereo image using a low-cost equal-power panning algorithm. The output is always stereo.
///
/// # Usage
///
/// ```
/// use web_play_rec::context::{BaseAudioContext, OfflineAudioContext};
/// use web_play_rec::node::AudioNode;
///
/// let context = OfflineAudioContext::new(2, 128, 44_100.);
/// let panner = context.create_stereo_panner();
/// panner.connect(&context.destination());
/// // position source on the left
/// panner.pan().set_value(-1.);
/// ```
#[derive(Debug)]
pub struct StereoPannerNode {
    /// Represents the node instance and its associated audio context
    registration: AudioContextRegistration,
    /// The position of the input in the output’s stereo image. -1 represents
    /// full left, +1 represents full right.
    pan: AudioParam,
}

impl AudioNode for StereoPannerNode {
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

impl StereoPannerNode {
    /// returns a `StereoPannerNode` instance
    ///
    /// # Arguments
    ///
    /// * `context` - audio context in which the audio node will live.
    /// * `options` - stereo panner options
    pub fn new<C: BaseAudioContext>(context: &C, options: StereoPannerOptions) -> Self {
        context.base().register(move |registration| {
            let pan_options = AudioParamDescriptor {
                min_value: -1.,
                max_value: 1.,
                default_value: 0.,
            };
            let (pan_param, pan_proc) = AudioParam::new(pan_options);

            pan_param.set_value(options.pan);

            let renderer = StereoPannerRenderer { pan: pan_proc };

            let node = Self {
                registration,
                pan: pan_param,
            };

            (node, Box::new(renderer))
        })
    }

    /// Returns the pan audio parameter
    #[must_use]
    pub fn pan(&self) -> &AudioParam {
        &self.pan
    }
}

/// `StereoPannerRenderer` represents the rendering part of `StereoPannerNode`
struct StereoPannerRenderer {
    /// Position of the input in the output’s stereo image.
    /// -1 represents full left, +1 represents full right.
    pan: AudioParamProcessor,
}

impl AudioProcessor for StereoPannerRenderer {
    fn process(&mut self, inputs: &[AudioBuffer], outputs: &mut [AudioBuffer], _: &RenderScope) {
        // single input/output node
        let input = &inputs[0];
        let output = &mut outputs[0];

        output.set_number_of_channels(2);

        if input.is_silent() {
            output.make_silent();
            return;
        }

        let pan = self.pan.value();
        let channels = input.channels();
        let [left, right] = match output.channels_mut() {
            [left, right] => [left, right],
            _ => unreachable!(),
        };

        match channels.len() {
            1 => {
                let x = (pan + 1.) * 0.5;
                let [gain_left, gain_right] = get_stereo_gains(x);

                left.iter_mut()
                    .zip(right.iter_mut())
                    .zip(channels[0].iter())
                    .for_each(|((l, r), input)| {
                        *l = input * gain_left;
                        *r = input * gain_right;
                    });
            }
            _ => {
                let x = if pan <= 0. { pan + 1. } else { pan };
                let [gain_left, gain_right] = get_stereo_gains(x);

                left.iter_mut()
                    .zip(right.iter_mut())
                    .zip(channels[0].iter())
                    .zip(channels[1].iter())
                    .for_each(|(((l, r), &input_left), &input_right)| {
                        if pan <= 0. {
                            *l = input_right.mul_add(gain_left, input_left);
                            *r = input_right * gain_right;
                        } else {
                            *l = input_left * gain_left;
                            *r = input_left.mul_add(gain_right, input_right);
                        }
                    });
            }
        }
    }
}
