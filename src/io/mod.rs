//! Audio input/output interfaces

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::context::AudioContextOptions;
use crate::control::ControlMessage;
use crate::events::EventDispatch;

mod none;
pub(crate) use none::NoneBackend;

#[cfg(feature = "cpal")]
mod cpal;
#[cfg(feature = "cpal")]
pub(crate) use self::cpal::{build_input, InputStream};

/// Failure to set up an audio stream
#[derive(Debug, Clone)]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub(crate) fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audio backend error: {}", self.message)
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug)]
pub(crate) struct ControlThreadInit {
    pub frames_played: Arc<AtomicU64>,
    pub ctrl_msg_send: Sender<ControlMessage>,
    pub event_send: Sender<EventDispatch>,
    pub event_recv: Receiver<EventDispatch>,
}

#[derive(Clone, Debug)]
pub(crate) struct RenderThreadInit {
    pub frames_played: Arc<AtomicU64>,
    pub ctrl_msg_recv: Receiver<ControlMessage>,
    pub event_send: Sender<EventDispatch>,
}

pub(crate) fn thread_init() -> (ControlThreadInit, RenderThreadInit) {
    // Track number of frames - synced from render thread to control thread
    let frames_played = Arc::new(AtomicU64::new(0));

    // Communication channel for ctrl msgs from the control thread to the render thread.
    // Use a bounded channel for real-time safety. A maximum of 256 control messages (add/remove
    // node, connect, ..) will be handled per render quantum. The control thread will block when
    // the capacity is reached.
    let (ctrl_msg_send, ctrl_msg_recv) = crossbeam_channel::bounded(256);

    // Communication channel for events from the render thread to the control thread.
    // Excess events are dropped when the capacity is reached.
    let (event_send, event_recv) = crossbeam_channel::bounded(256);

    let control_thread_init = ControlThreadInit {
        frames_played: Arc::clone(&frames_played),
        ctrl_msg_send,
        event_send: event_send.clone(),
        event_recv,
    };

    let render_thread_init = RenderThreadInit {
        frames_played,
        ctrl_msg_recv,
        event_send,
    };

    (control_thread_init, render_thread_init)
}

/// Set up an output stream (speakers) based on the sink id and the enabled features
pub(crate) fn build_output(
    options: &AudioContextOptions,
    render_thread_init: RenderThreadInit,
) -> Result<Box<dyn AudioBackendManager>, BackendError> {
    if options.sink_id == "none" {
        let backend = NoneBackend::build_output(options, render_thread_init)?;
        return Ok(Box::new(backend));
    }

    #[cfg(feature = "cpal")]
    {
        let backend = self::cpal::CpalBackend::build_output(options, render_thread_init)?;
        Ok(Box::new(backend))
    }
    #[cfg(not(feature = "cpal"))]
    {
        log::warn!("No audio device backend compiled in, falling back to sink 'none'");
        let backend = NoneBackend::build_output(options, render_thread_init)?;
        Ok(Box::new(backend))
    }
}

/// Interface for audio backends
pub(crate) trait AudioBackendManager: Send + Sync + 'static {
    /// Name of the concrete implementation - for debug purposes
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Setup a new output stream (speakers), initially suspended
    fn build_output(
        options: &AudioContextOptions,
        render_thread_init: RenderThreadInit,
    ) -> Result<Self, BackendError>
    where
        Self: Sized;

    /// Resume or start the stream
    fn resume(&self) -> bool;

    /// Suspend the stream
    fn suspend(&self) -> bool;

    /// Close the stream, freeing all resources. It cannot be started again after closing.
    fn close(&self);

    /// Sample rate of the stream
    fn sample_rate(&self) -> f32;

    /// Number of channels of the stream
    fn number_of_channels(&self) -> usize;

    /// The audio output device - `""` means the default device
    fn sink_id(&self) -> &str;
}
