// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Confab workspace.
//!
//! Timestamps are millisecond epoch integers assigned by the writer. Events
//! are immutable once created; receipts and reactions are separate documents
//! referencing a message id, never mutations of the message event itself.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Current wall-clock time as a millisecond epoch value.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The kind of a conversation event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    TypingStart,
    TypingStop,
    DeliveryReceipt,
    ReadReceipt,
    Reaction,
}

/// An immutable conversation event as stored in the durable event store.
///
/// `id` is globally unique and stable. `created_at` is monotonic per writer
/// but not unique across concurrent writers, so consumers deduplicate by id
/// within a timestamp tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub conversation_id: String,
    pub kind: EventKind,
    /// Millisecond epoch, server-assigned at write time.
    pub created_at: i64,
    /// Opaque JSON payload; shape depends on `kind`.
    pub payload: serde_json::Value,
}

/// Ephemeral per-user typing state, one logical row per (conversation, user).
///
/// Upserted in place rather than appended. Readers must treat a row as absent
/// once it is older than the staleness window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingIndicator {
    pub conversation_id: String,
    pub user_id: String,
    pub is_typing: bool,
    /// Millisecond epoch of the last upsert.
    pub updated_at: i64,
}

impl TypingIndicator {
    /// Whether this row is older than the staleness window at `now_ms`.
    pub fn is_stale(&self, now_ms: i64, staleness_ms: i64) -> bool {
        now_ms - self.updated_at > staleness_ms
    }
}

/// Delivery/read status carried by a receipt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Delivered,
    Read,
    Failed,
}

/// A receipt or reaction document keyed by a deterministic id.
///
/// Receipts carry `status` and no `emoji`; reactions carry `emoji` and no
/// `status`. The deterministic id makes writes idempotent: a duplicate client
/// retry overwrites rather than duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// `hash(message_id, user_id)` for receipts, `hash(message_id, user_id, emoji)`
    /// for reactions.
    pub id: String,
    pub message_id: String,
    /// Denormalized from the referenced message at write time; absent when the
    /// message could not be resolved.
    pub conversation_id: Option<String>,
    pub user_id: String,
    pub status: Option<ReceiptStatus>,
    pub emoji: Option<String>,
    /// Millisecond epoch of the last write.
    pub updated_at: i64,
}

/// The narrow view of a stored message needed by receipt and reaction writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    /// Millisecond epoch, server-assigned.
    pub created_at: i64,
}
