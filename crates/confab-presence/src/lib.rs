// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral per-user typing state with a staleness window.
//!
//! One logical row per `(conversation, user)`, upserted in place. Rows are
//! never hard-deleted here; readers ignore anything older than the staleness
//! window, so an instance crash at worst leaves a row that expires on its
//! own. Repeated "start" signals from key-repeat are rate-limited by the
//! refresh threshold, which stays safely below the staleness window
//! (enforced at config validation).

use std::sync::Arc;

use confab_bus::EventBus;
use confab_core::types::now_ms;
use confab_core::{ConfabError, Event, EventKind, EventStore, TypingIndicator};
use serde::Serialize;
use tracing::{debug, warn};

/// Presence tunables.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Age beyond which a typing row is ignored by readers, in milliseconds.
    pub staleness_ms: i64,
    /// Minimum interval between refresh upserts for a user already typing.
    pub refresh_ms: i64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            staleness_ms: 10_000,
            refresh_ms: 3_000,
        }
    }
}

/// Acknowledgement returned by [`TypingTracker::set_typing`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypingAck {
    pub is_typing: bool,
    /// Whether this call performed a store write. Suppressed refreshes and
    /// redundant stops acknowledge without writing.
    pub written: bool,
}

/// Manages typing indicator rows and their fan-out to connected sessions.
pub struct TypingTracker {
    store: Arc<dyn EventStore>,
    bus: Arc<EventBus>,
    config: PresenceConfig,
}

impl TypingTracker {
    pub fn new(store: Arc<dyn EventStore>, bus: Arc<EventBus>, config: PresenceConfig) -> Self {
        Self { store, bus, config }
    }

    /// Record that a user started or stopped typing.
    pub async fn set_typing(
        &self,
        conversation_id: &str,
        user_id: &str,
        is_typing: bool,
    ) -> Result<TypingAck, ConfabError> {
        self.set_typing_at(conversation_id, user_id, is_typing, now_ms())
            .await
    }

    /// [`set_typing`](Self::set_typing) with an explicit clock reading.
    pub async fn set_typing_at(
        &self,
        conversation_id: &str,
        user_id: &str,
        is_typing: bool,
        now_ms: i64,
    ) -> Result<TypingAck, ConfabError> {
        let existing = self.store.get_typing(conversation_id, user_id).await?;

        if is_typing {
            // A user already marked typing only refreshes once the threshold
            // has elapsed; this bounds write volume from key-repeat bursts.
            if let Some(prev) = &existing
                && prev.is_typing
                && now_ms - prev.updated_at < self.config.refresh_ms
            {
                return Ok(TypingAck {
                    is_typing: true,
                    written: false,
                });
            }
        } else if existing.as_ref().is_none_or(|prev| !prev.is_typing) {
            // "stop" with no prior "start": idempotent no-op.
            return Ok(TypingAck {
                is_typing: false,
                written: false,
            });
        }

        let row = TypingIndicator {
            conversation_id: conversation_id.to_string(),
            user_id: user_id.to_string(),
            is_typing,
            updated_at: now_ms,
        };
        self.store.upsert_typing(&row).await?;

        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            kind: if is_typing {
                EventKind::TypingStart
            } else {
                EventKind::TypingStop
            },
            created_at: now_ms,
            payload: serde_json::json!({ "user_id": user_id }),
        };
        // The durable append and the bus notify are fan-out, not the source
        // of truth for presence; failures are logged and the ack stands.
        if let Err(e) = self.store.append_event(&event).await {
            warn!(
                conversation_id,
                user_id,
                error = %e,
                "typing event append failed; indicator row is still current"
            );
        } else {
            self.bus.publish(&event);
        }

        debug!(conversation_id, user_id, is_typing, "typing state updated");
        Ok(TypingAck {
            is_typing,
            written: true,
        })
    }

    /// Users currently typing in a conversation, excluding stale rows,
    /// explicit non-typing rows, and the requesting user.
    pub async fn list_typing(
        &self,
        conversation_id: &str,
        requesting_user: &str,
    ) -> Result<Vec<String>, ConfabError> {
        self.list_typing_at(conversation_id, requesting_user, now_ms())
            .await
    }

    /// [`list_typing`](Self::list_typing) with an explicit clock reading.
    pub async fn list_typing_at(
        &self,
        conversation_id: &str,
        requesting_user: &str,
        now_ms: i64,
    ) -> Result<Vec<String>, ConfabError> {
        let rows = self.store.list_typing(conversation_id).await?;
        Ok(rows
            .into_iter()
            .filter(|row| {
                row.is_typing
                    && !row.is_stale(now_ms, self.config.staleness_ms)
                    && row.user_id != requesting_user
            })
            .map(|row| row.user_id)
            .collect())
    }
}
