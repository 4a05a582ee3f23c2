//! Recording live input to a 16-bit mono WAV file
//!
//! Samples are handed over by the audio callback through a bounded FIFO and written to disk by a
//! background thread, so the callback never blocks on the file system.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::context::BackendError;

/// Number of sample blocks the FIFO holds before incoming blocks are dropped
pub const FIFO_CAPACITY: usize = 256;

/// Failure to record
#[derive(Debug)]
pub enum RecorderError {
    /// The sample rate is not strictly positive
    InvalidSampleRate(f32),
    /// The WAV file could not be created or written
    Wav(hound::Error),
    /// The writer thread could not be spawned
    Io(std::io::Error),
    /// The writer thread panicked, the file is likely truncated
    WriterPanicked,
    /// No input stream could be set up
    Backend(BackendError),
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(sr) => write!(f, "invalid sample rate for recording: {}", sr),
            Self::Wav(e) => write!(f, "unable to write WAV file: {}", e),
            Self::Io(e) => write!(f, "unable to start recorder: {}", e),
            Self::WriterPanicked => f.write_str("recorder writer thread panicked"),
            Self::Backend(e) => write!(f, "unable to open input: {}", e),
        }
    }
}

impl std::error::Error for RecorderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wav(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Backend(e) => Some(e),
            Self::InvalidSampleRate(_) | Self::WriterPanicked => None,
        }
    }
}

impl From<hound::Error> for RecorderError {
    fn from(e: hound::Error) -> Self {
        Self::Wav(e)
    }
}

impl From<BackendError> for RecorderError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

struct Take {
    path: PathBuf,
    sender: Sender<Vec<f32>>,
    /// samples dropped by `write`, reported when the take stops
    dropped: AtomicUsize,
    writer: JoinHandle<Result<u32, hound::Error>>,
}

/// WAV recorder, cheap to clone so the audio callback can hold a handle
///
/// # Usage
///
/// ```no_run
/// use web_play_rec::record::Recorder;
///
/// let recorder = Recorder::new();
/// recorder.start("take.wav", 48_000.).unwrap();
/// recorder.write(&[0.; 128]);
/// recorder.stop().unwrap();
/// ```
#[derive(Clone, Default)]
pub struct Recorder {
    take: Arc<Mutex<Option<Take>>>,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("recording", &self.is_recording())
            .finish_non_exhaustive()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new take, stopping the current one first
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid sample rate or when the file cannot be created.
    pub fn start<P: AsRef<Path>>(&self, path: P, sample_rate: f32) -> Result<(), RecorderError> {
        if let Err(e) = self.stop() {
            log::warn!("Previous take did not finish cleanly: {}", e);
        }

        if sample_rate.is_nan() || sample_rate <= 0. {
            return Err(RecorderError::InvalidSampleRate(sample_rate));
        }

        let path = path.as_ref().to_path_buf();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: sample_rate as u32,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut wav = hound::WavWriter::create(&path, spec)?;

        let (sender, receiver) = crossbeam_channel::bounded::<Vec<f32>>(FIFO_CAPACITY);

        let writer = std::thread::Builder::new()
            .name("webplayrec-recorder".to_string())
            .spawn(move || -> Result<u32, hound::Error> {
                let mut frames = 0;
                for block in receiver.iter() {
                    for sample in block {
                        let value = (sample.clamp(-1., 1.) * i16::MAX as f32).round() as i16;
                        wav.write_sample(value)?;
                        frames += 1;
                    }
                }
                wav.finalize()?;
                Ok(frames)
            })
            .map_err(RecorderError::Io)?;

        log::info!("Recording to {} at {} Hz", path.display(), spec.sample_rate);

        *self.lock() = Some(Take {
            path,
            sender,
            dropped: AtomicUsize::new(0),
            writer,
        });

        Ok(())
    }

    /// Queue a block of mono samples, dropped when not recording or when the FIFO is full
    ///
    /// This never blocks and does not log, so it is safe to call from an audio callback.
    /// Dropped samples are counted and reported by [`stop`](Self::stop).
    pub fn write(&self, block: &[f32]) {
        let guard = match self.take.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            // a take is being started or stopped
            Err(TryLockError::WouldBlock) => return,
        };

        if let Some(take) = guard.as_ref() {
            // full FIFO or a writer that is gone
            if take.sender.try_send(block.to_vec()).is_err() {
                take.dropped.fetch_add(block.len(), Ordering::Relaxed);
            }
        }
    }

    /// Number of samples of the current take that `write` had to drop
    pub fn dropped_samples(&self) -> usize {
        self.lock()
            .as_ref()
            .map_or(0, |take| take.dropped.load(Ordering::Relaxed))
    }

    /// Finish the current take, returning the path of the written file
    ///
    /// # Errors
    ///
    /// Returns an error when writing or finalizing the file failed.
    pub fn stop(&self) -> Result<Option<PathBuf>, RecorderError> {
        let take = match self.lock().take() {
            Some(take) => take,
            None => return Ok(None),
        };

        // closing the FIFO lets the writer drain it and finalize the file
        drop(take.sender);

        let dropped = take.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            log::warn!(
                "Recorder FIFO overflowed, {} samples missing from {}",
                dropped,
                take.path.display()
            );
        }

        let frames = take
            .writer
            .join()
            .map_err(|_| RecorderError::WriterPanicked)??;

        log::info!("Recorded {} frames to {}", frames, take.path.display());

        Ok(Some(take.path))
    }

    pub fn is_recording(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Take>> {
        match self.take.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Live input from the default input device, feeding a [`Recorder`]
pub struct InputCapture {
    #[cfg(feature = "cpal")]
    stream: crate::io::InputStream,
    sample_rate: f32,
    recorder: Recorder,
}

impl fmt::Debug for InputCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputCapture")
            .field("sample_rate", &self.sample_rate)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

impl InputCapture {
    /// Open the default input device, its samples are passed to `recorder` while it records
    ///
    /// # Errors
    ///
    /// Returns an error when no suitable input device is available, or when the crate is built
    /// without the `cpal` feature.
    pub fn open(recorder: Recorder) -> Result<Self, RecorderError> {
        #[cfg(feature = "cpal")]
        {
            let sink = recorder.clone();
            let stream = crate::io::build_input(move |block| sink.write(block))?;

            Ok(Self {
                sample_rate: stream.sample_rate(),
                stream,
                recorder,
            })
        }
        #[cfg(not(feature = "cpal"))]
        {
            drop(recorder);
            Err(RecorderError::Backend(BackendError::new(
                "no input backend compiled in",
            )))
        }
    }

    /// Sample rate of the input device
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Start a take on the input at the device sample rate
    ///
    /// # Errors
    ///
    /// See [`Recorder::start`].
    pub fn record<P: AsRef<Path>>(&self, path: P) -> Result<(), RecorderError> {
        self.recorder.start(path, self.sample_rate)
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }
}

impl Drop for InputCapture {
    fn drop(&mut self) {
        #[cfg(feature = "cpal")]
        self.stream.close();

        if let Err(e) = self.recorder.stop() {
            log::warn!("Recording did not finish cleanly: {}", e);
        }
    }
}
