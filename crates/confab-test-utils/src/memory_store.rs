// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`EventStore`] for deterministic tests.
//!
//! Backed by plain maps behind a mutex, with switches to inject transient
//! read/write failures so error-absorption paths can be exercised.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use confab_core::{ConfabError, Event, EventStore, Receipt, StoredMessage, TypingIndicator};

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    typing: HashMap<(String, String), TypingIndicator>,
    receipts: HashMap<String, Receipt>,
    messages: HashMap<String, StoredMessage>,
}

/// In-memory event store with injectable failures.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read primitive return a store error until reset.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make every write primitive return a store error until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a message row (the message write path itself lives outside the
    /// delivery subsystem).
    pub fn insert_message(&self, message: StoredMessage) {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.insert(message.id.clone(), message);
    }

    /// Total number of appended events, across all conversations.
    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }

    /// Number of stored receipt/reaction documents.
    pub fn receipt_count(&self) -> usize {
        self.inner.lock().unwrap().receipts.len()
    }

    fn check_read(&self) -> Result<(), ConfabError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ConfabError::Store {
                source: "injected query failure".into(),
            });
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), ConfabError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfabError::Store {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append_event(&self, event: &Event) -> Result<(), ConfabError> {
        self.check_write()?;
        self.inner.lock().unwrap().events.push(event.clone());
        Ok(())
    }

    async fn events_since(
        &self,
        conversation_id: &str,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<Event>, ConfabError> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        let mut page: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.conversation_id == conversation_id && e.created_at >= since_ms)
            .cloned()
            .collect();
        // Stable sort keeps append order within a millisecond tick, matching
        // the durable store's non-decreasing ordering contract.
        page.sort_by_key(|e| e.created_at);
        page.truncate(limit);
        Ok(page)
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<StoredMessage>, ConfabError> {
        self.check_read()?;
        Ok(self.inner.lock().unwrap().messages.get(message_id).cloned())
    }

    async fn upsert_typing(&self, indicator: &TypingIndicator) -> Result<(), ConfabError> {
        self.check_write()?;
        let key = (
            indicator.conversation_id.clone(),
            indicator.user_id.clone(),
        );
        self.inner.lock().unwrap().typing.insert(key, indicator.clone());
        Ok(())
    }

    async fn get_typing(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<Option<TypingIndicator>, ConfabError> {
        self.check_read()?;
        let key = (conversation_id.to_string(), user_id.to_string());
        Ok(self.inner.lock().unwrap().typing.get(&key).cloned())
    }

    async fn list_typing(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<TypingIndicator>, ConfabError> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<TypingIndicator> = inner
            .typing
            .values()
            .filter(|t| t.conversation_id == conversation_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(rows)
    }

    async fn get_receipt(&self, id: &str) -> Result<Option<Receipt>, ConfabError> {
        self.check_read()?;
        Ok(self.inner.lock().unwrap().receipts.get(id).cloned())
    }

    async fn upsert_receipt(&self, receipt: &Receipt) -> Result<(), ConfabError> {
        self.check_write()?;
        self.inner
            .lock()
            .unwrap()
            .receipts
            .insert(receipt.id.clone(), receipt.clone());
        Ok(())
    }

    async fn delete_receipt(&self, id: &str) -> Result<bool, ConfabError> {
        self.check_write()?;
        Ok(self.inner.lock().unwrap().receipts.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::EventKind;

    fn event(id: &str, created_at: i64) -> Event {
        Event {
            id: id.to_string(),
            conversation_id: "c1".to_string(),
            kind: EventKind::Message,
            created_at,
            payload: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn events_since_is_inclusive_and_ordered() {
        let store = MemoryEventStore::new();
        store.append_event(&event("b", 2_000)).await.unwrap();
        store.append_event(&event("a", 1_000)).await.unwrap();
        store.append_event(&event("c", 2_000)).await.unwrap();

        let page = store.events_since("c1", 2_000, 50).await.unwrap();
        let ids: Vec<_> = page.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn injected_failures_are_scoped() {
        let store = MemoryEventStore::new();
        store.set_fail_queries(true);
        assert!(store.events_since("c1", 0, 50).await.is_err());
        // Writes still work while only queries fail.
        assert!(store.append_event(&event("a", 1)).await.is_ok());

        store.set_fail_queries(false);
        store.set_fail_writes(true);
        assert!(store.append_event(&event("b", 2)).await.is_err());
        assert_eq!(store.events_since("c1", 0, 50).await.unwrap().len(), 1);
    }
}
