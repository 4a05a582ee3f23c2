//! Button press telemetry: the payload, the `Notifier` seam and its HTTP implementation

use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

/// Path of the endpoint receiving button presses, relative to the server base url
pub const BUTTON_PRESSED_PATH: &str = "/buttonPressed";

/// Body of a `POST /buttonPressed` request: the slider values at the time of the press
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonPressed {
    pub pan: f32,
    pub volume: f32,
}

/// Receiver of button press notifications
///
/// Implementations must return promptly: `notify` is called from the UI event loop.
pub trait Notifier {
    fn notify(&self, payload: ButtonPressed);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, payload: ButtonPressed) {
        (**self).notify(payload)
    }
}

/// Fire-and-forget HTTP notifier
///
/// Payloads are queued to a dedicated worker thread which posts them as JSON to
/// `{base_url}/buttonPressed`, one request at a time and in order. The response body is logged,
/// failures are logged and dropped. Dropping the notifier waits for the queued requests.
///
/// # Usage
///
/// ```no_run
/// use web_play_rec::notify::{ButtonPressed, HttpNotifier, Notifier};
///
/// let notifier = HttpNotifier::new("http://localhost:5000");
/// notifier.notify(ButtonPressed { pan: 0., volume: 1. });
/// ```
pub struct HttpNotifier {
    endpoint: String,
    sender: Option<Sender<ButtonPressed>>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for HttpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNotifier")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpNotifier {
    pub fn new<S: AsRef<str>>(base_url: S) -> Self {
        let endpoint = format!(
            "{}{}",
            base_url.as_ref().trim_end_matches('/'),
            BUTTON_PRESSED_PATH
        );

        let (sender, receiver) = crossbeam_channel::unbounded::<ButtonPressed>();

        let worker_endpoint = endpoint.clone();
        let worker = std::thread::spawn(move || {
            let client = reqwest::blocking::Client::new();

            for payload in receiver.iter() {
                post(&client, &worker_endpoint, payload);
            }

            log::debug!("Notifier worker has terminated");
        });

        log::debug!("Notifier posting to {}", endpoint);

        Self {
            endpoint,
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Full url of the endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn post(client: &reqwest::blocking::Client, endpoint: &str, payload: ButtonPressed) {
    let result = client
        .post(endpoint)
        .json(&payload)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json::<serde_json::Value>());

    match result {
        Ok(body) => log::info!("{} responded {}", endpoint, body),
        Err(e) => log::warn!("Failed to notify {}: {}", endpoint, e),
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, payload: ButtonPressed) {
        log::debug!("Queueing button press {:?}", payload);

        if let Some(sender) = self.sender.as_ref() {
            if sender.send(payload).is_err() {
                log::warn!("Discarding button press - notifier worker is gone");
            }
        }
    }
}

impl Drop for HttpNotifier {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        drop(self.sender.take());

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Notifier worker panicked");
            }
        }
    }
}
