// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message lookup table.
//!
//! The message write path lives outside the delivery subsystem; this module
//! only maintains the narrow lookup the receipt and reaction writers need,
//! plus an insert used by that external path and by tests.

use confab_core::{ConfabError, StoredMessage};
use rusqlite::params;

use crate::database::Database;

/// Insert a message row.
pub async fn insert_message(db: &Database, message: &StoredMessage) -> Result<(), ConfabError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    message.id,
                    message.conversation_id,
                    message.sender_id,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve a message id, or `None` if unknown.
pub async fn get_message(
    db: &Database,
    message_id: &str,
) -> Result<Option<StoredMessage>, ConfabError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, created_at
                 FROM messages WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![message_id], |row| {
                Ok(StoredMessage {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    created_at: row.get(3)?,
                })
            });
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
