// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emoji reaction toggling with at-most-one semantics.
//!
//! The deterministic id over `(message, user, emoji)` means "react" and
//! "un-react" are the same client action: if the document exists it is
//! deleted, otherwise created. No read-modify-write transaction is needed
//! beyond the single existence check.

use std::sync::Arc;

use confab_bus::EventBus;
use confab_core::types::now_ms;
use confab_core::{ConfabError, Event, EventKind, EventStore, Receipt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ids::reaction_id;

/// Which side of the toggle this call landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl ToggleOutcome {
    pub fn added(self) -> bool {
        self == ToggleOutcome::Added
    }
}

/// Toggles an emoji reaction per message per user.
pub struct ReactionToggle {
    store: Arc<dyn EventStore>,
    bus: Arc<EventBus>,
}

impl ReactionToggle {
    pub fn new(store: Arc<dyn EventStore>, bus: Arc<EventBus>) -> Self {
        Self { store, bus }
    }

    /// Add the reaction if absent, remove it if present.
    ///
    /// Unlike receipts, the referenced message must exist: without it there
    /// is no conversation to attribute the reaction to, so absence is a
    /// terminal [`ConfabError::MessageNotFound`].
    pub async fn toggle(
        &self,
        message_id: &str,
        user_id: &str,
        emoji: &str,
    ) -> Result<ToggleOutcome, ConfabError> {
        self.toggle_at(message_id, user_id, emoji, now_ms()).await
    }

    /// [`toggle`](Self::toggle) with an explicit clock reading.
    pub async fn toggle_at(
        &self,
        message_id: &str,
        user_id: &str,
        emoji: &str,
        now_ms: i64,
    ) -> Result<ToggleOutcome, ConfabError> {
        if emoji.is_empty() {
            return Err(ConfabError::InvalidInput("emoji must not be empty".into()));
        }

        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| ConfabError::MessageNotFound(message_id.to_string()))?;

        let id = reaction_id(message_id, user_id, emoji);
        let outcome = if self.store.get_receipt(&id).await?.is_some() {
            self.store.delete_receipt(&id).await?;
            ToggleOutcome::Removed
        } else {
            let reaction = Receipt {
                id,
                message_id: message_id.to_string(),
                conversation_id: Some(message.conversation_id.clone()),
                user_id: user_id.to_string(),
                status: None,
                emoji: Some(emoji.to_string()),
                updated_at: now_ms,
            };
            self.store.upsert_receipt(&reaction).await?;
            ToggleOutcome::Added
        };

        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: message.conversation_id,
            kind: EventKind::Reaction,
            created_at: now_ms,
            payload: serde_json::json!({
                "message_id": message_id,
                "user_id": user_id,
                "emoji": emoji,
                "removed": outcome == ToggleOutcome::Removed,
            }),
        };
        if let Err(e) = self.store.append_event(&event).await {
            warn!(
                message_id,
                error = %e,
                "reaction event append failed; reaction document is current"
            );
        } else {
            self.bus.publish(&event);
        }

        debug!(message_id, user_id, emoji, ?outcome, "reaction toggled");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::StoredMessage;
    use confab_test_utils::MemoryEventStore;

    fn seeded_store() -> Arc<MemoryEventStore> {
        let store = Arc::new(MemoryEventStore::new());
        store.insert_message(StoredMessage {
            id: "m1".to_string(),
            conversation_id: "c1".to_string(),
            sender_id: "u1".to_string(),
            created_at: 500,
        });
        store
    }

    fn toggle(store: Arc<MemoryEventStore>) -> ReactionToggle {
        ReactionToggle::new(store, Arc::new(EventBus::default()))
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let store = seeded_store();
        let t = toggle(store.clone());

        let first = t.toggle_at("m1", "u2", "👍", 1_000).await.unwrap();
        assert_eq!(first, ToggleOutcome::Added);
        assert_eq!(store.receipt_count(), 1);

        let second = t.toggle_at("m1", "u2", "👍", 1_500).await.unwrap();
        assert_eq!(second, ToggleOutcome::Removed);
        assert_eq!(store.receipt_count(), 0);
    }

    #[tokio::test]
    async fn distinct_emoji_are_independent_documents() {
        let store = seeded_store();
        let t = toggle(store.clone());

        t.toggle_at("m1", "u2", "👍", 1_000).await.unwrap();
        t.toggle_at("m1", "u2", "❤", 1_100).await.unwrap();
        assert_eq!(store.receipt_count(), 2);

        // Removing one leaves the other.
        t.toggle_at("m1", "u2", "👍", 1_200).await.unwrap();
        assert_eq!(store.receipt_count(), 1);
        let remaining = store
            .get_receipt(&reaction_id("m1", "u2", "❤"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(remaining.emoji.as_deref(), Some("❤"));
    }

    #[tokio::test]
    async fn missing_message_is_terminal() {
        let store = Arc::new(MemoryEventStore::new());
        let t = toggle(store);

        let err = t.toggle_at("ghost", "u2", "👍", 1_000).await.unwrap_err();
        assert!(matches!(err, ConfabError::MessageNotFound(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn empty_emoji_is_rejected() {
        let store = seeded_store();
        let t = toggle(store);

        let err = t.toggle_at("m1", "u2", "", 1_000).await.unwrap_err();
        assert!(matches!(err, ConfabError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn removal_publishes_a_removed_reaction_event() {
        let store = seeded_store();
        let bus = Arc::new(EventBus::default());
        let t = ReactionToggle::new(store.clone(), bus.clone());

        let mut sub = bus.subscribe("c1");
        t.toggle_at("m1", "u2", "👍", 1_000).await.unwrap();
        t.toggle_at("m1", "u2", "👍", 1_500).await.unwrap();

        let added = sub.recv().await.unwrap();
        assert_eq!(added.kind, EventKind::Reaction);
        assert_eq!(added.payload["removed"], false);

        let removed = sub.recv().await.unwrap();
        assert_eq!(removed.payload["removed"], true);
        assert_eq!(removed.payload["emoji"], "👍");
    }
}
