//! The `AudioContext` type

use crate::context::{AudioContextState, BackendError, BaseAudioContext, ConcreteBaseAudioContext};
use crate::events::EventLoop;
use crate::io::{self, AudioBackendManager};

/// Specify the playback configuration for the [`AudioContext`] constructor.
///
/// All fields are optional and will default to the value best suited for interactive playback on
/// your hardware platform.
#[derive(Clone, Debug, Default)]
pub struct AudioContextOptions {
    /// Sample rate of the audio context and audio output hardware. Use `None` for a default value.
    pub sample_rate: Option<f32>,

    /// The audio output device
    /// - use `""` for the default audio output device
    /// - use `"none"` to process the audio graph without playing through an audio output device.
    pub sink_id: String,
}

/// This interface represents an audio graph whose `AudioDestinationNode` is routed to a real-time
/// output device that produces a signal directed at the user.
///
/// A freshly constructed context is [`Suspended`](AudioContextState::Suspended): like a browser
/// applying its autoplay policy, no audio flows until [`resume`](AudioContext::resume) is called
/// in response to a user gesture.
pub struct AudioContext {
    /// represents the underlying `BaseAudioContext`
    base: ConcreteBaseAudioContext,
    /// audio backend (play/pause functionality)
    backend_manager: Box<dyn AudioBackendManager>,
}

impl std::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("sink_id", &self.sink_id())
            .field("backend", &self.backend_manager.name())
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl BaseAudioContext for AudioContext {
    fn base(&self) -> &ConcreteBaseAudioContext {
        &self.base
    }
}

impl AudioContext {
    /// Creates and returns a new `AudioContext` object.
    ///
    /// This will play live audio on the output device selected by `options.sink_id`, once resumed.
    ///
    /// # Errors
    ///
    /// Returns an error when no output stream could be set up for the requested device.
    pub fn new(options: AudioContextOptions) -> Result<Self, BackendError> {
        let (control_thread_init, render_thread_init) = io::thread_init();
        let backend = io::build_output(&options, render_thread_init)?;

        let event_loop = EventLoop::new();
        event_loop.run(control_thread_init.event_recv);

        let base = ConcreteBaseAudioContext::new(
            backend.sample_rate(),
            backend.number_of_channels(),
            control_thread_init.frames_played,
            control_thread_init.ctrl_msg_send,
            event_loop,
            false,
        );

        log::info!(
            "AudioContext created on sink {:?} at {} Hz, {} channels",
            backend.sink_id(),
            backend.sample_rate(),
            backend.number_of_channels()
        );

        Ok(Self {
            base,
            backend_manager: backend,
        })
    }

    /// Identifier of the current audio output device.
    #[must_use]
    pub fn sink_id(&self) -> &str {
        self.backend_manager.sink_id()
    }

    /// Suspends the progression of time in the audio context, temporarily halting audio hardware
    /// access and reducing CPU/battery usage in the process.
    pub fn suspend(&self) {
        if self.state() == AudioContextState::Closed {
            log::warn!("Cannot suspend a closed AudioContext");
            return;
        }

        if self.backend_manager.suspend() {
            self.base.set_state(AudioContextState::Suspended);
        }
    }

    /// Resumes the progression of time in an audio context that has previously been
    /// suspended/paused.
    pub fn resume(&self) {
        if self.state() == AudioContextState::Closed {
            log::warn!("Cannot resume a closed AudioContext");
            return;
        }

        if self.backend_manager.resume() {
            self.base.set_state(AudioContextState::Running);
        }
    }

    /// Closes the `AudioContext`, releasing the system resources being used.
    ///
    /// This will not automatically release all `AudioContext`-created objects, but will suspend
    /// the progression of the currentTime, and stop processing audio data.
    pub fn close(&self) {
        if self.state() == AudioContextState::Closed {
            return;
        }

        self.backend_manager.close();
        self.base.set_state(AudioContextState::Closed);
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.close();
    }
}
