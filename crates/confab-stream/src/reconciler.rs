// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling reconciliation against the durable event store.
//!
//! The reconciler is the only discovery path guaranteed to work across
//! server instances; the in-process bus is just a shortcut. A store failure
//! or timeout is absorbed as an empty tick so a single flaky query never
//! terminates a long-lived stream.

use std::sync::Arc;
use std::time::Duration;

use confab_core::{Event, EventStore};
use tracing::warn;

use crate::cursor::Cursor;

/// Polls one conversation's event stream on behalf of one session.
pub struct Reconciler {
    store: Arc<dyn EventStore>,
    conversation_id: String,
    page_size: usize,
    store_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn EventStore>,
        conversation_id: impl Into<String>,
        page_size: usize,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            conversation_id: conversation_id.into(),
            page_size,
            store_timeout,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Fetch newly observed events and advance the cursor past them.
    ///
    /// Queries with an inclusive `created_at >=` bound and runs every returned
    /// event through [`Cursor::admit`], so ties on the cursor timestamp are
    /// delivered at most once per id. Transient store failures return an empty
    /// page; the caller retries on its next tick.
    pub async fn poll(&self, cursor: &mut Cursor) -> Vec<Event> {
        let query = self.store.events_since(
            &self.conversation_id,
            cursor.last_seen_created_at(),
            self.page_size,
        );

        let page = match tokio::time::timeout(self.store_timeout, query).await {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                warn!(
                    conversation_id = self.conversation_id.as_str(),
                    error = %e,
                    "event store poll failed; retrying next tick"
                );
                return Vec::new();
            }
            Err(_) => {
                warn!(
                    conversation_id = self.conversation_id.as_str(),
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "event store poll timed out; retrying next tick"
                );
                return Vec::new();
            }
        };

        page.into_iter().filter(|e| cursor.admit(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::EventKind;
    use confab_test_utils::MemoryEventStore;

    fn event(id: &str, conversation_id: &str, created_at: i64) -> Event {
        Event {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            kind: EventKind::Message,
            created_at,
            payload: serde_json::json!({"text": "hello"}),
        }
    }

    fn reconciler(store: Arc<MemoryEventStore>) -> Reconciler {
        Reconciler::new(store, "c1", 50, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn discovers_new_event_and_advances_cursor() {
        // A message sent at t=1000 is discovered by a session polling from 999.
        let store = Arc::new(MemoryEventStore::new());
        store.append_event(&event("m1", "c1", 1_000)).await.unwrap();

        let rec = reconciler(store);
        let mut cursor = Cursor::starting_at(999);

        let events = rec.poll(&mut cursor).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "m1");
        assert_eq!(cursor.last_seen_created_at(), 1_000);
    }

    #[tokio::test]
    async fn repolling_does_not_redeliver() {
        let store = Arc::new(MemoryEventStore::new());
        store.append_event(&event("m1", "c1", 1_000)).await.unwrap();

        let rec = reconciler(store);
        let mut cursor = Cursor::starting_at(999);

        assert_eq!(rec.poll(&mut cursor).await.len(), 1);
        assert!(rec.poll(&mut cursor).await.is_empty());
    }

    #[tokio::test]
    async fn timestamp_ties_are_both_delivered_exactly_once() {
        let store = Arc::new(MemoryEventStore::new());
        store.append_event(&event("m1", "c1", 1_000)).await.unwrap();

        let rec = reconciler(store.clone());
        let mut cursor = Cursor::starting_at(999);
        assert_eq!(rec.poll(&mut cursor).await.len(), 1);

        // A second event lands in the same millisecond after the first poll.
        store.append_event(&event("m2", "c1", 1_000)).await.unwrap();

        let events = rec.poll(&mut cursor).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "m2");
    }

    #[tokio::test]
    async fn other_conversations_are_invisible() {
        let store = Arc::new(MemoryEventStore::new());
        store.append_event(&event("m1", "c2", 1_000)).await.unwrap();

        let rec = reconciler(store);
        let mut cursor = Cursor::starting_at(0);
        assert!(rec.poll(&mut cursor).await.is_empty());
    }

    #[tokio::test]
    async fn respects_page_size() {
        let store = Arc::new(MemoryEventStore::new());
        for i in 0..10 {
            store
                .append_event(&event(&format!("m{i}"), "c1", 1_000 + i))
                .await
                .unwrap();
        }

        let rec = Reconciler::new(store, "c1", 3, Duration::from_millis(500));
        let mut cursor = Cursor::starting_at(0);

        let first = rec.poll(&mut cursor).await;
        assert_eq!(first.len(), 3);
        assert_eq!(cursor.last_seen_created_at(), 1_002);

        // The next poll picks up from the cursor, not from the beginning.
        let second = rec.poll(&mut cursor).await;
        assert_eq!(second[0].id, "m3");
    }

    #[tokio::test]
    async fn store_failure_is_absorbed_as_empty_tick() {
        let store = Arc::new(MemoryEventStore::new());
        store.append_event(&event("m1", "c1", 1_000)).await.unwrap();
        store.set_fail_queries(true);

        let rec = reconciler(store.clone());
        let mut cursor = Cursor::starting_at(0);

        assert!(rec.poll(&mut cursor).await.is_empty());

        // Recovery on a later tick delivers the event.
        store.set_fail_queries(false);
        let events = rec.poll(&mut cursor).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "m1");
    }
}
