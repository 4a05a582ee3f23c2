use crate::context::AudioNodeId;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;

/// The Event interface
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Event {
    pub type_: &'static str,
}

#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) enum EventType {
    Ended(AudioNodeId),
}

pub(crate) struct EventDispatch {
    type_: EventType,
}

impl EventDispatch {
    pub fn ended(id: AudioNodeId) -> Self {
        EventDispatch {
            type_: EventType::Ended(id),
        }
    }

    fn event(&self) -> Event {
        match self.type_ {
            EventType::Ended(_) => Event { type_: "ended" },
        }
    }
}

pub(crate) enum EventHandler {
    Multiple(Box<dyn FnMut(Event) + Send + 'static>),
}

/// Dispatches events from the render thread to user supplied handlers on a dedicated thread
#[derive(Clone, Default)]
pub(crate) struct EventLoop {
    event_handlers: Arc<Mutex<HashMap<EventType, EventHandler>>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self, event_channel: Receiver<EventDispatch>) {
        let self_clone = self.clone();

        std::thread::spawn(move || {
            // this thread is dedicated to event handling so we can block
            for event in event_channel.iter() {
                self_clone.dispatch(event);
            }

            log::debug!("Event loop has terminated");
        });
    }

    fn dispatch(&self, event: EventDispatch) {
        let mut handlers = match self.event_handlers.lock() {
            Ok(handlers) => handlers,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(EventHandler::Multiple(mut f)) = handlers.remove(&event.type_) {
            (f)(event.event());
            handlers.insert(event.type_, EventHandler::Multiple(f));
        }
        // handlers Mutex guard drops here
    }

    pub fn set_handler(&self, event: EventType, callback: EventHandler) {
        if let Ok(mut handlers) = self.event_handlers.lock() {
            handlers.insert(event, callback);
        }
    }

    pub fn clear_handler(&self, event: EventType) {
        if let Ok(mut handlers) = self.event_handlers.lock() {
            handlers.remove(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_handler_runs_until_cleared() {
        let event_loop = EventLoop::new();
        let count = Arc::new(AtomicU32::new(0));

        let id = AudioNodeId(3);
        let count_clone = Arc::clone(&count);
        event_loop.set_handler(
            EventType::Ended(id),
            EventHandler::Multiple(Box::new(move |e| {
                assert_eq!(e.type_, "ended");
                count_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        event_loop.dispatch(EventDispatch::ended(id));
        event_loop.dispatch(EventDispatch::ended(id));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        event_loop.clear_handler(EventType::Ended(id));
        event_loop.dispatch(EventDispatch::ended(id));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_other_node_is_ignored() {
        let event_loop = EventLoop::new();
        let count = Arc::new(AtomicU32::new(0));

        let count_clone = Arc::clone(&count);
        event_loop.set_handler(
            EventType::Ended(AudioNodeId(1)),
            EventHandler::Multiple(Box::new(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        event_loop.dispatch(EventDispatch::ended(AudioNodeId(2)));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
