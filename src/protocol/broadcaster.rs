//! Snapshot fan-out to connected observers.
//!
//! The broadcaster keeps a fixed-capacity set of [`Subscriber`]s keyed by
//! the transport's client id and writes every published snapshot to each of
//! them.  Delivery is fire-and-forget: a failed write is counted and logged,
//! nothing more.  Dead sessions are removed by the transport calling
//! [`StateBroadcaster::unsubscribe`], never by the broadcaster itself.

use heapless::Vec;
use log::{debug, warn};

use crate::regulation::StateView;

use super::snapshot;

/// Maximum number of simultaneously connected observers.
pub const MAX_OBSERVERS: usize = 4;

/// Transport-assigned client identifier (WebSocket session handle on device).
pub type ClientId = i32;

/// One observer's outbound text channel.
pub trait Subscriber {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Queue one text frame for delivery.  Must not block.
    fn send_text(&mut self, frame: &str) -> Result<(), Self::Error>;
}

/// Errors from subscription management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastError {
    /// All observer slots are taken.
    Full,
}

impl core::fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "observer table full ({} slots)", MAX_OBSERVERS),
        }
    }
}

/// Publish-subscribe broadcaster for state snapshots.
pub struct StateBroadcaster<S: Subscriber> {
    subscribers: Vec<(ClientId, S), MAX_OBSERVERS>,
    published: u32,
    failed_deliveries: u32,
}

impl<S: Subscriber> StateBroadcaster<S> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            published: 0,
            failed_deliveries: 0,
        }
    }

    /// Register an observer.  An existing entry with the same id is replaced.
    pub fn subscribe(&mut self, client_id: ClientId, subscriber: S) -> Result<(), BroadcastError> {
        if let Some(slot) = self.subscribers.iter_mut().find(|(id, _)| *id == client_id) {
            slot.1 = subscriber;
            return Ok(());
        }
        self.subscribers
            .push((client_id, subscriber))
            .map_err(|_| BroadcastError::Full)?;
        debug!("Broadcaster: client {} subscribed", client_id);
        Ok(())
    }

    /// Remove an observer.  Returns it if it was registered.
    pub fn unsubscribe(&mut self, client_id: ClientId) -> Option<S> {
        let idx = self.subscribers.iter().position(|(id, _)| *id == client_id)?;
        debug!("Broadcaster: client {} unsubscribed", client_id);
        Some(self.subscribers.swap_remove(idx).1)
    }

    /// Serialize `view` once and send it to every observer.
    ///
    /// Returns the number of observers the frame was handed to successfully.
    pub fn publish(&mut self, view: &StateView) -> usize {
        if self.subscribers.is_empty() {
            return 0;
        }
        let frame = match snapshot::encode(view) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Broadcaster: snapshot encode failed: {}", e);
                return 0;
            }
        };

        self.published = self.published.wrapping_add(1);
        let mut delivered = 0;
        for (id, subscriber) in &mut self.subscribers {
            match subscriber.send_text(&frame) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    self.failed_deliveries = self.failed_deliveries.wrapping_add(1);
                    debug!("Broadcaster: delivery to client {} failed: {:?}", id, e);
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshots published to at least one observer since startup.
    pub fn published_count(&self) -> u32 {
        self.published
    }

    pub fn failed_deliveries(&self) -> u32 {
        self.failed_deliveries
    }
}

impl<S: Subscriber> Default for StateBroadcaster<S> {
    fn default() -> Self {
        Self::new()
    }
}
