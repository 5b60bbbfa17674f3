// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The durable event store contract.
//!
//! The store is an external collaborator shared across all server instances.
//! Confab only requires these narrow query/write primitives, not the store's
//! internal implementation. Events are append-mostly; typing indicators and
//! receipts are targeted upserts/deletes by key rather than broad scans.

use async_trait::async_trait;

use crate::error::ConfabError;
use crate::types::{Event, Receipt, StoredMessage, TypingIndicator};

/// Query/write primitives of the durable event store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append an immutable event to the conversation stream.
    async fn append_event(&self, event: &Event) -> Result<(), ConfabError>;

    /// Events in a conversation with `created_at >= since_ms` (inclusive),
    /// in non-decreasing `created_at` order, bounded to `limit` rows.
    ///
    /// The lower bound is inclusive on purpose: store timestamps have
    /// millisecond granularity, so an exclusive filter could permanently skip
    /// events created in the same millisecond as the last delivered one.
    async fn events_since(
        &self,
        conversation_id: &str,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<Event>, ConfabError>;

    /// Resolve a message id to its conversation, or `None` if unknown.
    async fn get_message(&self, message_id: &str) -> Result<Option<StoredMessage>, ConfabError>;

    /// Upsert the typing row for `(indicator.conversation_id, indicator.user_id)`.
    async fn upsert_typing(&self, indicator: &TypingIndicator) -> Result<(), ConfabError>;

    /// The typing row for one user in one conversation, if any.
    async fn get_typing(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<Option<TypingIndicator>, ConfabError>;

    /// All typing rows for a conversation, stale or not; callers filter.
    async fn list_typing(&self, conversation_id: &str)
    -> Result<Vec<TypingIndicator>, ConfabError>;

    /// A receipt/reaction document by its deterministic id.
    async fn get_receipt(&self, id: &str) -> Result<Option<Receipt>, ConfabError>;

    /// Upsert a receipt/reaction document by its deterministic id.
    async fn upsert_receipt(&self, receipt: &Receipt) -> Result<(), ConfabError>;

    /// Delete a receipt/reaction document. Returns whether a row existed.
    async fn delete_receipt(&self, id: &str) -> Result<bool, ConfabError>;
}
