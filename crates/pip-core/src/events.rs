//! Typed event buses
//!
//! Each component declares one event enum and publishes it on its own
//! [`EventBus`]. Subscribers get an [`EventStream`] of exactly that type, so
//! the event-name-to-payload mapping is checked by the compiler.

use tokio::sync::broadcast;

/// Default buffered events per subscriber
pub const DEFAULT_CAPACITY: usize = 64;

/// Publisher side of a component's events
#[derive(Debug, Clone)]
pub struct EventBus<E: Clone> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
    /// Create a bus buffering up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events emitted from now on
    #[must_use]
    pub fn subscribe(&self) -> EventStream<E> {
        EventStream {
            receiver: self.sender.subscribe(),
        }
    }

    /// Emit an event, returning how many subscribers received it
    ///
    /// Emitting without subscribers is not an error.
    pub fn emit(&self, event: E) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Subscriber side of a component's events
#[derive(Debug)]
pub struct EventStream<E: Clone> {
    receiver: broadcast::Receiver<E>,
}

impl<E: Clone> EventStream<E> {
    /// Wait for the next event
    ///
    /// Returns `None` once every publisher is dropped. Lagged events are
    /// skipped with a warning.
    pub async fn next(&mut self) -> Option<E> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next already-buffered event without waiting
    pub fn try_next(&mut self) -> Option<E> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("event subscriber lagged, skipped {} events", skipped);
                }
                Err(_) => return None,
            }
        }
    }

    /// Drain every buffered event
    pub fn drain(&mut self) -> Vec<E> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
