//! Audio IO using the `cpal` library
use std::sync::{Arc, Mutex};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    InputCallbackInfo, OutputCallbackInfo, SampleFormat, Stream, StreamConfig,
};

use super::{AudioBackendManager, BackendError, RenderThreadInit};

use crate::context::AudioContextOptions;
use crate::graph::RenderThread;

mod private {
    use super::*;

    #[derive(Clone)]
    pub struct ThreadSafeClosableStream(Arc<Mutex<Option<Stream>>>);

    impl ThreadSafeClosableStream {
        pub fn new(stream: Stream) -> Self {
            Self(Arc::new(Mutex::new(Some(stream))))
        }

        pub fn close(&self) {
            if let Ok(mut stream) = self.0.lock() {
                stream.take(); // will Drop
            }
        }

        pub fn resume(&self) -> bool {
            if let Ok(stream) = self.0.lock() {
                if let Some(s) = stream.as_ref() {
                    if let Err(e) = s.play() {
                        log::error!("Error resuming cpal stream: {:?}", e);
                        return false;
                    }
                    return true;
                }
            }

            false
        }

        pub fn suspend(&self) -> bool {
            if let Ok(stream) = self.0.lock() {
                if let Some(s) = stream.as_ref() {
                    if let Err(e) = s.pause() {
                        log::error!("Error suspending cpal stream: {:?}", e);
                        return false;
                    }
                    return true;
                }
            }

            false
        }
    }

    // SAFETY:
    // The cpal `Stream` is marked !Sync and !Send because some platforms are not thread-safe
    // https://github.com/RustAudio/cpal/commit/33ddf749548d87bf54ce18eb342f954cec1465b2
    // Since we wrap the Stream in a Mutex, we should be fine
    unsafe impl Sync for ThreadSafeClosableStream {}
    unsafe impl Send for ThreadSafeClosableStream {}
}
use private::ThreadSafeClosableStream;

fn err_fn(err: cpal::StreamError) {
    log::error!("an error occurred on the audio stream: {}", err);
}

/// Audio backend using the `cpal` library
#[derive(Clone)]
pub(crate) struct CpalBackend {
    stream: ThreadSafeClosableStream,
    sample_rate: f32,
    number_of_channels: usize,
    sink_id: String,
}

impl AudioBackendManager for CpalBackend {
    fn build_output(
        options: &AudioContextOptions,
        render_thread_init: RenderThreadInit,
    ) -> Result<Self, BackendError>
    where
        Self: Sized,
    {
        let host = cpal::default_host();
        log::info!("Host: {:?}", host.id());

        let RenderThreadInit {
            frames_played,
            ctrl_msg_recv,
            event_send,
        } = render_thread_init;

        let device = host
            .default_output_device()
            .ok_or_else(|| BackendError::new("no output device available"))?;

        log::info!("Output device: {:?}", device.name());

        let supported = device
            .default_output_config()
            .map_err(|e| BackendError::new(format!("error while querying config: {}", e)))?;
        let sample_format = supported.sample_format();

        let mut config: StreamConfig = supported.into();

        // set specific sample rate if requested
        if let Some(sample_rate) = options.sample_rate {
            crate::assert_valid_sample_rate(sample_rate);
            config.sample_rate.0 = sample_rate as u32;
        }

        let number_of_channels = usize::from(config.channels);
        let sample_rate = config.sample_rate.0 as f32;

        log::debug!("Output stream config: {:?} {:?}", config, sample_format);

        let mut renderer = RenderThread::new(
            sample_rate,
            number_of_channels,
            ctrl_msg_recv,
            frames_played,
            Some(event_send),
        );

        let stream = match sample_format {
            SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &OutputCallbackInfo| renderer.render(data),
                err_fn,
                None,
            ),
            SampleFormat::I16 => {
                let mut scratch: Vec<f32> = vec![];
                device.build_output_stream(
                    &config,
                    move |data: &mut [i16], _: &OutputCallbackInfo| {
                        scratch.resize(data.len(), 0.);
                        renderer.render(&mut scratch);
                        data.iter_mut()
                            .zip(scratch.iter())
                            .for_each(|(o, i)| *o = cpal::Sample::from_sample(*i));
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let mut scratch: Vec<f32> = vec![];
                device.build_output_stream(
                    &config,
                    move |data: &mut [u16], _: &OutputCallbackInfo| {
                        scratch.resize(data.len(), 0.);
                        renderer.render(&mut scratch);
                        data.iter_mut()
                            .zip(scratch.iter())
                            .for_each(|(o, i)| *o = cpal::Sample::from_sample(*i));
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(BackendError::new(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| BackendError::new(format!("unable to build output stream: {}", e)))?;

        // the context starts suspended, audio only flows after `resume`
        if let Err(e) = stream.pause() {
            log::debug!("Unable to pause freshly built stream: {:?}", e);
        }

        Ok(Self {
            stream: ThreadSafeClosableStream::new(stream),
            sample_rate,
            number_of_channels,
            sink_id: options.sink_id.clone(),
        })
    }

    fn resume(&self) -> bool {
        self.stream.resume()
    }

    fn suspend(&self) -> bool {
        self.stream.suspend()
    }

    fn close(&self) {
        self.stream.close()
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn number_of_channels(&self) -> usize {
        self.number_of_channels
    }

    fn sink_id(&self) -> &str {
        self.sink_id.as_str()
    }
}

/// Running input stream (microphone), stops capturing when dropped or closed
#[derive(Clone)]
pub(crate) struct InputStream {
    stream: ThreadSafeClosableStream,
    sample_rate: f32,
}

impl InputStream {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn close(&self) {
        self.stream.close()
    }
}

/// Open the default input device, handing every block of captured frames (down-mixed to mono)
/// to `callback`
pub(crate) fn build_input<F>(mut callback: F) -> Result<InputStream, BackendError>
where
    F: FnMut(&[f32]) + Send + 'static,
{
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| BackendError::new("no input device available"))?;

    log::info!("Input device: {:?}", device.name());

    let supported = device
        .default_input_config()
        .map_err(|e| BackendError::new(format!("error while querying config: {}", e)))?;

    if supported.sample_format() != SampleFormat::F32 {
        return Err(BackendError::new(format!(
            "unsupported input sample format {:?}",
            supported.sample_format()
        )));
    }

    let config: StreamConfig = supported.into();
    let number_of_channels = usize::from(config.channels).max(1);
    let sample_rate = config.sample_rate.0 as f32;

    let mut mono: Vec<f32> = vec![];
    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &InputCallbackInfo| {
                mono.clear();
                mono.extend(
                    data.chunks(number_of_channels)
                        .map(|frame| frame.iter().sum::<f32>() / number_of_channels as f32),
                );
                callback(&mono);
            },
            err_fn,
            None,
        )
        .map_err(|e| BackendError::new(format!("unable to build input stream: {}", e)))?;

    let stream = ThreadSafeClosableStream::new(stream);
    if !stream.resume() {
        return Err(BackendError::new("unable to start input stream"));
    }

    Ok(InputStream {
        stream,
        sample_rate,
    })
}
