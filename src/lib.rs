//! Play/pause and volume/pan controls over a Web Audio style graph, with button-press telemetry.
//!
//! The audio side is a small in-process rendition of the Web Audio API: an [`AudioContext`]
//! drives a render thread that processes a graph of nodes. A [`PlaybackController`] wires a
//! play button and two sliders to a `source -> gain -> panner -> destination` chain and reports
//! every play/pause toggle to a server endpoint.
//!
//! # Example
//! ```no_run
//! use web_play_rec::buffer::AudioBuffer;
//! use web_play_rec::context::AudioContextOptions;
//! use web_play_rec::controller::PlaybackController;
//! use web_play_rec::media::MediaElement;
//! use web_play_rec::notify::HttpNotifier;
//!
//! let element = MediaElement::from_buffer(AudioBuffer::new(2, 48_000, 48_000.));
//! let notifier = HttpNotifier::new("http://localhost:5000");
//! let options = AudioContextOptions::default();
//! let mut controller = PlaybackController::new(element, notifier, options);
//!
//! controller.on_volume_input(0.5);
//! // builds the graph and resumes the context on first use
//! controller.on_play_click()?;
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! controller.on_play_click()?;
//! # Ok::<(), web_play_rec::context::BackendError>(())
//! ```
//!
//! [`AudioContext`]: context::AudioContext
//! [`PlaybackController`]: controller::PlaybackController

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Render quantum size, the audio graph is rendered in blocks of this size
pub const RENDER_QUANTUM_SIZE: usize = 128;

/// Maximum number of channels for audio processing
pub const MAX_CHANNELS: usize = 32;

pub mod buffer;
pub mod context;
pub mod controller;
pub mod media;
pub mod node;
pub mod notify;
pub mod panel;
pub mod param;
pub mod record;
pub mod server;

pub(crate) mod control;
pub(crate) mod events;
pub(crate) mod graph;
pub(crate) mod io;

pub use events::Event;

/// Atomic float 32, only `load` and `store` are supported, no arithmetic
#[derive(Debug)]
pub(crate) struct AtomicF32 {
    inner: AtomicU32,
}

impl AtomicF32 {
    pub fn new(v: f32) -> Self {
        Self {
            inner: AtomicU32::new(v.to_bits()),
        }
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::SeqCst))
    }

    pub fn store(&self, v: f32) {
        self.inner.store(v.to_bits(), Ordering::SeqCst);
    }
}

/// Atomic float 64, only `load` and `store` are supported, no arithmetic
#[derive(Debug, Default)]
pub(crate) struct AtomicF64 {
    inner: AtomicU64,
}

impl AtomicF64 {
    pub fn new(v: f64) -> Self {
        Self {
            inner: AtomicU64::new(v.to_bits()),
        }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.inner.load(Ordering::SeqCst))
    }

    pub fn store(&self, v: f64) {
        self.inner.store(v.to_bits(), Ordering::SeqCst);
    }
}

/// Assert that the given sample rate is valid.
///
/// # Panics
///
/// This function will panic if the given sample rate is not strictly positive
#[track_caller]
#[inline(always)]
pub(crate) fn assert_valid_sample_rate(sample_rate: f32) {
    assert!(
        sample_rate > 0.,
        "NotSupportedError - Invalid sample rate: {:?}, should be greater than zero",
        sample_rate
    );
}
