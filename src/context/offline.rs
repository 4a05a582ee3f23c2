//! The `OfflineAudioContext` type

use crate::buffer::AudioBuffer;
use crate::context::{AudioContextState, BaseAudioContext, ConcreteBaseAudioContext};
use crate::events::EventLoop;
use crate::graph::RenderThread;
use crate::{assert_valid_sample_rate, RENDER_QUANTUM_SIZE};

/// The `OfflineAudioContext` doesn't render the audio to the device hardware; instead, it generates
/// it, as fast as it can, and outputs the result to an `AudioBuffer`.
pub struct OfflineAudioContext {
    /// represents the underlying `BaseAudioContext`
    base: ConcreteBaseAudioContext,
    /// the size of the buffer in sample-frames
    length: usize,
    /// number of channels of the rendered buffer
    number_of_channels: usize,
    /// the rendering 'thread', fully controlled by the offline context
    renderer: RenderThread,
}

impl BaseAudioContext for OfflineAudioContext {
    fn base(&self) -> &ConcreteBaseAudioContext {
        &self.base
    }
}

impl OfflineAudioContext {
    /// Creates an `OfflineAudioContext` instance
    ///
    /// # Arguments
    ///
    /// * `number_of_channels` - number of output channels to render
    /// * `length` - length of the rendering audio buffer
    /// * `sample_rate` - output sample rate
    #[must_use]
    pub fn new(number_of_channels: usize, length: usize, sample_rate: f32) -> Self {
        assert_valid_sample_rate(sample_rate);

        let (control_thread_init, render_thread_init) = crate::io::thread_init();

        // setup the render 'thread', which will run inside the control thread
        let renderer = RenderThread::new(
            sample_rate,
            number_of_channels,
            render_thread_init.ctrl_msg_recv,
            render_thread_init.frames_played,
            Some(render_thread_init.event_send),
        );

        let event_loop = EventLoop::new();
        event_loop.run(control_thread_init.event_recv);

        let base = ConcreteBaseAudioContext::new(
            sample_rate,
            number_of_channels,
            control_thread_init.frames_played,
            control_thread_init.ctrl_msg_send,
            event_loop,
            true,
        );

        Self {
            base,
            length,
            number_of_channels,
            renderer,
        }
    }

    /// Given the current connections, render `length` frames of audio.
    ///
    /// This function blocks the current thread and returns the rendered `AudioBuffer`.
    pub fn start_rendering_sync(mut self) -> AudioBuffer {
        self.base.set_state(AudioContextState::Running);

        let mut output = AudioBuffer::new(self.number_of_channels, self.length, self.sample_rate());
        let mut quantum = AudioBuffer::new(1, RENDER_QUANTUM_SIZE, self.sample_rate());

        for offset in (0..self.length).step_by(RENDER_QUANTUM_SIZE) {
            let rendered = self.renderer.render_audiobuffer();
            rendered.copy_frames_into(&mut quantum, 0);
            quantum.set_number_of_channels(self.number_of_channels);

            let frames = (self.length - offset).min(RENDER_QUANTUM_SIZE);
            output
                .channels_mut()
                .iter_mut()
                .zip(quantum.channels())
                .for_each(|(o, q)| o[offset..offset + frames].copy_from_slice(&q[..frames]));
        }

        self.base.set_state(AudioContextState::Closed);

        output
    }

    /// get the length of rendering audio buffer
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn render_empty_graph() {
        let context = OfflineAudioContext::new(2, 555, 44_100.);
        let buffer = context.start_rendering_sync();

        assert_eq!(buffer.number_of_channels(), 2);
        assert_eq!(buffer.length(), 555);
        assert_float_eq!(buffer.get_channel_data(0), &[0.; 555][..], abs_all <= 0.);
        assert_float_eq!(buffer.get_channel_data(1), &[0.; 555][..], abs_all <= 0.);
    }

    #[test]
    fn render_advances_time() {
        let context = OfflineAudioContext::new(1, 256, 44_100.);
        assert_float_eq!(context.current_time(), 0., abs <= 0.);

        let base = context.base().clone();
        let _ = context.start_rendering_sync();
        assert_float_eq!(base.current_time(), 256. / 44_100., abs <= 1e-9);
    }
}
