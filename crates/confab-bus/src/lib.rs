// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Same-instance publish/subscribe registry keyed by conversation id.
//!
//! The bus is strictly a latency optimization: when a producer and a stream
//! session live in the same process, an event reaches the session immediately
//! instead of waiting for the next store poll. The polling reconciler remains
//! the correctness path, so publishing is fire-and-forget and a subscriber
//! that lags simply falls back to polling.

use confab_core::Event;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default per-conversation channel capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Per-process event bus with one broadcast channel per active conversation.
///
/// Construct one instance per server process and pass it explicitly to the
/// components that publish or subscribe; there is no global singleton.
pub struct EventBus {
    channels: DashMap<String, broadcast::Sender<Event>>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to all events published for `conversation_id`.
    ///
    /// The subscription is released by dropping the returned handle; the
    /// channel entry itself is pruned lazily on the next publish with no
    /// remaining receivers.
    pub fn subscribe(&self, conversation_id: &str) -> BusSubscription {
        let receiver = self
            .channels
            .entry(conversation_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        debug!(conversation_id, "bus subscription added");
        BusSubscription {
            conversation_id: conversation_id.to_string(),
            receiver,
        }
    }

    /// Publish an event to same-process subscribers of its conversation.
    ///
    /// Returns the number of receivers the event reached. Publishing to a
    /// conversation with no subscribers is a no-op.
    pub fn publish(&self, event: &Event) -> usize {
        let Some(sender) = self
            .channels
            .get(&event.conversation_id)
            .map(|entry| entry.value().clone())
        else {
            return 0;
        };

        match sender.send(event.clone()) {
            Ok(reached) => reached,
            Err(_) => {
                // Last receiver is gone; drop the channel entry.
                self.channels
                    .remove_if(&event.conversation_id, |_, s| s.receiver_count() == 0);
                0
            }
        }
    }

    /// Number of live subscribers for a conversation.
    pub fn subscriber_count(&self, conversation_id: &str) -> usize {
        self.channels
            .get(conversation_id)
            .map(|entry| entry.value().receiver_count())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A live subscription to one conversation's bus channel.
pub struct BusSubscription {
    conversation_id: String,
    receiver: broadcast::Receiver<Event>,
}

impl BusSubscription {
    /// Receive the next published event.
    ///
    /// Returns `None` once the channel is closed. A lagged receiver skips the
    /// missed events with a warning; the reconciler will deliver them.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(
                        conversation_id = self.conversation_id.as_str(),
                        missed, "bus subscriber lagged; missed events fall back to polling"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}
