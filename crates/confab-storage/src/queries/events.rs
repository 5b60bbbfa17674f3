// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event stream queries: append-only writes and cursor-bounded reads.

use confab_core::{ConfabError, Event, EventKind};
use rusqlite::params;

use crate::database::Database;

/// Append an immutable event row.
pub async fn append_event(db: &Database, event: &Event) -> Result<(), ConfabError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| {
            let payload = serde_json::to_string(&event.payload)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            conn.execute(
                "INSERT INTO events (id, conversation_id, kind, created_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    event.id,
                    event.conversation_id,
                    event.kind.to_string(),
                    event.created_at,
                    payload,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Events with `created_at >= since_ms` (inclusive) in non-decreasing
/// timestamp order, ties broken by id for a stable page order.
pub async fn events_since(
    db: &Database,
    conversation_id: &str,
    since_ms: i64,
    limit: usize,
) -> Result<Vec<Event>, ConfabError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, kind, created_at, payload
                 FROM events
                 WHERE conversation_id = ?1 AND created_at >= ?2
                 ORDER BY created_at ASC, id ASC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(
                params![conversation_id, since_ms, limit as i64],
                row_to_event,
            )?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<Event, rusqlite::Error> {
    let kind_str: String = row.get(2)?;
    let kind = kind_str.parse::<EventKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let payload_str: String = row.get(4)?;
    let payload = serde_json::from_str(&payload_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Event {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        kind,
        created_at: row.get(3)?,
        payload,
    })
}
