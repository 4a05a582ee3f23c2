use std::thread;
use std::time::{Duration, Instant};

use super::{AudioBackendManager, BackendError, RenderThreadInit};
use crate::context::AudioContextOptions;
use crate::graph::RenderThread;
use crate::RENDER_QUANTUM_SIZE;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

const NUMBER_OF_CHANNELS: usize = 2;
const DEFAULT_SAMPLE_RATE: f32 = 48_000.;

enum NoneBackendMessage {
    Resume,
    Suspend,
    Close,
}

/// Backend without an audio device, the graph is rendered on a timer and the output discarded
#[derive(Clone)]
pub(crate) struct NoneBackend {
    sender: Sender<NoneBackendMessage>,
    sample_rate: f32,
}

struct Callback {
    receiver: Receiver<NoneBackendMessage>,
    render_thread: RenderThread,
    sample_rate: f32,
    running: bool,
}

impl Callback {
    fn run(mut self) {
        let buffer_size = RENDER_QUANTUM_SIZE;
        let mut buffer = vec![0.; buffer_size * NUMBER_OF_CHANNELS];
        let interval = Duration::from_secs_f32(buffer_size as f32 / self.sample_rate);

        // For an isochronous callback we must calculate the deadline every render quantum
        let mut deadline = Instant::now() + interval;

        loop {
            // poll the receiver as long as the deadline is in the future
            loop {
                match self.receiver.recv_deadline(deadline) {
                    // closed explicitly, or all senders are gone because the context was dropped
                    Ok(NoneBackendMessage::Close) | Err(RecvTimeoutError::Disconnected) => return,
                    Ok(NoneBackendMessage::Resume) => {
                        self.running = true;
                        deadline = Instant::now() + interval;
                        break; // start processing right away
                    }
                    Ok(NoneBackendMessage::Suspend) => self.running = false,
                    Err(RecvTimeoutError::Timeout) => break,
                }
            }

            if self.running {
                self.render_thread.render(&mut buffer[..]);
            }

            deadline += interval;
        }
    }
}

impl AudioBackendManager for NoneBackend {
    fn build_output(
        options: &AudioContextOptions,
        render_thread_init: RenderThreadInit,
    ) -> Result<Self, BackendError>
    where
        Self: Sized,
    {
        let sample_rate = options.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        crate::assert_valid_sample_rate(sample_rate);

        let RenderThreadInit {
            frames_played,
            ctrl_msg_recv,
            event_send,
        } = render_thread_init;

        let render_thread = RenderThread::new(
            sample_rate,
            NUMBER_OF_CHANNELS,
            ctrl_msg_recv,
            frames_played,
            Some(event_send),
        );

        let (sender, receiver) = crossbeam_channel::unbounded();

        let callback = Callback {
            render_thread,
            receiver,
            sample_rate,
            running: false,
        };

        thread::Builder::new()
            .name("webplayrec-render-none".into())
            .spawn(move || callback.run())
            .map_err(|e| BackendError::new(format!("unable to spawn render thread: {}", e)))?;

        log::debug!("Started 'none' backend at {} Hz", sample_rate);

        Ok(Self {
            sender,
            sample_rate,
        })
    }

    fn resume(&self) -> bool {
        self.sender.send(NoneBackendMessage::Resume).is_ok()
    }

    fn suspend(&self) -> bool {
        self.sender.send(NoneBackendMessage::Suspend).is_ok()
    }

    fn close(&self) {
        let _ = self.sender.send(NoneBackendMessage::Close);
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn number_of_channels(&self) -> usize {
        NUMBER_OF_CHANNELS
    }

    fn sink_id(&self) -> &str {
        "none"
    }
}
