// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent delivery/read receipt recording.
//!
//! One receipt document per `(message, user)`, keyed by a deterministic id.
//! Re-recording the same status is acknowledged without a write; a new
//! status overwrites in place. History is not retained.

use std::sync::Arc;

use confab_bus::EventBus;
use confab_core::types::now_ms;
use confab_core::{ConfabError, Event, EventKind, EventStore, Receipt, ReceiptStatus};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ids::receipt_id;

/// Acknowledgement returned by [`ReceiptRecorder::record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptAck {
    pub message_id: String,
    pub status: ReceiptStatus,
    pub updated_at: i64,
}

/// Records delivery/read status per message per user.
pub struct ReceiptRecorder {
    store: Arc<dyn EventStore>,
    bus: Arc<EventBus>,
}

impl ReceiptRecorder {
    pub fn new(store: Arc<dyn EventStore>, bus: Arc<EventBus>) -> Self {
        Self { store, bus }
    }

    /// Record `status` for `(message_id, user_id)`.
    pub async fn record(
        &self,
        message_id: &str,
        user_id: &str,
        status: ReceiptStatus,
    ) -> Result<ReceiptAck, ConfabError> {
        self.record_at(message_id, user_id, status, now_ms()).await
    }

    /// [`record`](Self::record) with an explicit clock reading.
    pub async fn record_at(
        &self,
        message_id: &str,
        user_id: &str,
        status: ReceiptStatus,
        now_ms: i64,
    ) -> Result<ReceiptAck, ConfabError> {
        let id = receipt_id(message_id, user_id);

        // Denormalize the conversation from the referenced message for query
        // efficiency; an unresolvable message is non-fatal and the receipt is
        // written without it.
        let conversation_id = match self.store.get_message(message_id).await {
            Ok(Some(message)) => Some(message.conversation_id),
            Ok(None) => {
                debug!(message_id, "receipt references an unknown message");
                None
            }
            Err(e) => {
                warn!(
                    message_id,
                    error = %e,
                    "message lookup failed; recording receipt without conversation"
                );
                None
            }
        };

        if let Some(prev) = self.store.get_receipt(&id).await?
            && prev.status == Some(status)
        {
            // Duplicate retry: acknowledge without writing.
            return Ok(ReceiptAck {
                message_id: message_id.to_string(),
                status,
                updated_at: prev.updated_at,
            });
        }

        let receipt = Receipt {
            id,
            message_id: message_id.to_string(),
            conversation_id: conversation_id.clone(),
            user_id: user_id.to_string(),
            status: Some(status),
            emoji: None,
            updated_at: now_ms,
        };
        self.store.upsert_receipt(&receipt).await?;

        if let Some(conversation_id) = conversation_id {
            let event = Event {
                id: uuid::Uuid::new_v4().to_string(),
                conversation_id,
                kind: match status {
                    ReceiptStatus::Read => EventKind::ReadReceipt,
                    ReceiptStatus::Delivered | ReceiptStatus::Failed => {
                        EventKind::DeliveryReceipt
                    }
                },
                created_at: now_ms,
                payload: serde_json::json!({
                    "message_id": message_id,
                    "user_id": user_id,
                    "status": status,
                }),
            };
            if let Err(e) = self.store.append_event(&event).await {
                warn!(
                    message_id,
                    error = %e,
                    "receipt event append failed; receipt document is current"
                );
            } else {
                self.bus.publish(&event);
            }
        }

        debug!(message_id, user_id, %status, "receipt recorded");
        Ok(ReceiptAck {
            message_id: message_id.to_string(),
            status,
            updated_at: now_ms,
        })
    }
}
