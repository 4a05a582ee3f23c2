//! Media playback: the `MediaElement` and file decoding

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::buffer::AudioBuffer;
use crate::{AtomicF64, RENDER_QUANTUM_SIZE};

mod decoding;
pub use decoding::MediaError;

/// Requests from the control side, picked up by the render side at the next quantum
///
/// Repeated requests coalesce, so the control side never waits for the render thread.
#[derive(Debug, Default)]
struct PendingActions {
    /// rewind when the element had ended
    play: AtomicBool,
    seek: AtomicBool,
    /// seconds, valid while `seek` is set
    seek_target: AtomicF64,
}

/// Shim of the `<audio>` element, holding a fully decoded track
///
/// Playback state lives in atomics shared with the render side, so [`paused`](Self::paused) and
/// [`ended`](Self::ended) reflect a [`play`](Self::play) or [`pause`](Self::pause) call
/// immediately. The element produces sound only once it is attached to an audio graph with
/// [`create_media_element_source`](crate::context::BaseAudioContext::create_media_element_source).
///
/// # Usage
///
/// ```no_run
/// use web_play_rec::context::{AudioContext, AudioContextOptions, BaseAudioContext};
/// use web_play_rec::media::MediaElement;
/// use web_play_rec::node::AudioNode;
///
/// let context = AudioContext::new(AudioContextOptions::default()).unwrap();
/// let mut media = MediaElement::new("samples/track.ogg").unwrap();
///
/// let src = context.create_media_element_source(&mut media);
/// src.connect(&context.destination());
///
/// context.resume();
/// media.set_loop(true);
/// media.play();
/// ```
pub struct MediaElement {
    stream: Option<MediaElementStream>,
    duration: f64,
    current_time: Arc<AtomicF64>,
    actions: Arc<PendingActions>,
    loop_: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
}

impl std::fmt::Debug for MediaElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaElement")
            .field("duration", &self.duration())
            .field("current_time", &self.current_time())
            .field("loop", &self.loop_())
            .field("paused", &self.paused())
            .field("ended", &self.ended())
            .finish_non_exhaustive()
    }
}

impl MediaElement {
    /// Decode the Ogg Vorbis or WAV file at the given path
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, is not Ogg Vorbis or WAV, or holds no
    /// audio frames.
    pub fn new<P: AsRef<Path>>(file: P) -> Result<Self, MediaError> {
        let buffer = decoding::decode_file(file)?;
        Ok(Self::from_buffer(buffer))
    }

    /// Create an element playing the given buffer
    pub fn from_buffer(buffer: AudioBuffer) -> Self {
        let actions = Arc::new(PendingActions::default());

        let duration = buffer.duration();
        let current_time = Arc::new(AtomicF64::new(0.));
        let loop_ = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(true));
        let ended = Arc::new(AtomicBool::new(false));

        let stream = MediaElementStream {
            buffer,
            position: 0.,
            finished: false,
            current_time: Arc::clone(&current_time),
            actions: Arc::clone(&actions),
            loop_: Arc::clone(&loop_),
            paused: Arc::clone(&paused),
            ended: Arc::clone(&ended),
        };

        Self {
            stream: Some(stream),
            duration,
            current_time,
            actions,
            loop_,
            paused,
            ended,
        }
    }

    pub(crate) fn take_stream(&mut self) -> Option<MediaElementStream> {
        self.stream.take()
    }

    /// Duration of the track in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Playback position in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time.load()
    }

    /// Seek to the given position in seconds
    pub fn set_current_time(&self, value: f64) {
        let value = value.clamp(0., self.duration);
        self.current_time.store(value);
        self.actions.seek_target.store(value);
        self.actions.seek.store(true, Ordering::SeqCst);
    }

    pub fn loop_(&self) -> bool {
        self.loop_.load(Ordering::SeqCst)
    }

    pub fn set_loop(&self, value: bool) {
        self.loop_.store(value, Ordering::SeqCst);
    }

    /// Start playback, from the start of the track when it had ended
    pub fn play(&self) {
        // the rewind request must be visible before the render side sees `paused == false`
        self.actions.play.store(true, Ordering::SeqCst);
        self.ended.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// True when playback stopped because the end of the track was reached
    pub fn ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

/// Render side of a [`MediaElement`], resampling the track to the context rate
pub(crate) struct MediaElementStream {
    buffer: AudioBuffer,
    /// read position in frames of the track, fractional when resampling
    position: f64,
    /// set when the end was reached and the `ended` event was dispatched
    finished: bool,
    current_time: Arc<AtomicF64>,
    actions: Arc<PendingActions>,
    loop_: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
}

impl std::fmt::Debug for MediaElementStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaElementStream")
            .field("number_of_channels", &self.buffer.number_of_channels())
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl MediaElementStream {
    fn handle_actions(&mut self) {
        if self.actions.seek.swap(false, Ordering::SeqCst) {
            let value = self.actions.seek_target.load();
            self.position = value * self.buffer.sample_rate() as f64;
            self.finished = false;
        }

        if self.actions.play.swap(false, Ordering::SeqCst) && self.finished {
            self.position = 0.;
            self.current_time.store(0.);
            self.finished = false;
        }
    }

    /// Render the next quantum at `sample_rate` into `output`
    ///
    /// Returns true exactly once per run-through, when the end of the track is reached.
    pub(crate) fn render_quantum(&mut self, sample_rate: f32, output: &mut AudioBuffer) -> bool {
        self.handle_actions();

        output.set_number_of_channels(self.buffer.number_of_channels());

        if self.paused.load(Ordering::SeqCst) || self.finished {
            output.make_silent();
            return false;
        }

        let length = self.buffer.length() as f64;
        let step = self.buffer.sample_rate() as f64 / sample_rate as f64;
        // an empty track cannot wrap around, it ends right away
        let loop_ = self.loop_.load(Ordering::SeqCst) && length > 0.;

        let mut position = self.position;
        let mut rendered = 0;

        while rendered < RENDER_QUANTUM_SIZE {
            if position >= length {
                if !loop_ {
                    break;
                }
                position %= length;
            }

            let index = position as usize;
            let frac = (position - index as f64) as f32;

            for (channel, out) in self
                .buffer
                .channels()
                .iter()
                .zip(output.channels_mut().iter_mut())
            {
                let a = channel[index];
                let b = match channel.get(index + 1) {
                    Some(b) => *b,
                    None if loop_ => channel[0],
                    None => a,
                };
                out[rendered] = (b - a).mul_add(frac, a);
            }

            position += step;
            rendered += 1;
        }

        // zero the tail of a partial quantum
        output
            .channels_mut()
            .iter_mut()
            .for_each(|c| c[rendered..].iter_mut().for_each(|v| *v = 0.));

        self.position = position;
        self.current_time
            .store((position.min(length)) / self.buffer.sample_rate() as f64);

        if position >= length && !loop_ {
            self.finished = true;
            self.ended.store(true, Ordering::SeqCst);
            self.paused.store(true, Ordering::SeqCst);
            return true;
        }

        false
    }
}
