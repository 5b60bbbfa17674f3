// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typing indicator upserts and reads.

use confab_core::{ConfabError, TypingIndicator};
use rusqlite::params;

use crate::database::Database;

/// Upsert the row for `(conversation_id, user_id)` in place.
pub async fn upsert_typing(db: &Database, indicator: &TypingIndicator) -> Result<(), ConfabError> {
    let indicator = indicator.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO typing_indicators (conversation_id, user_id, is_typing, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(conversation_id, user_id) DO UPDATE SET
                     is_typing = excluded.is_typing,
                     updated_at = excluded.updated_at",
                params![
                    indicator.conversation_id,
                    indicator.user_id,
                    indicator.is_typing,
                    indicator.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The typing row for one user, if any.
pub async fn get_typing(
    db: &Database,
    conversation_id: &str,
    user_id: &str,
) -> Result<Option<TypingIndicator>, ConfabError> {
    let conversation_id = conversation_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT conversation_id, user_id, is_typing, updated_at
                 FROM typing_indicators
                 WHERE conversation_id = ?1 AND user_id = ?2",
            )?;
            let result = stmt.query_row(params![conversation_id, user_id], row_to_indicator);
            match result {
                Ok(indicator) => Ok(Some(indicator)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All typing rows for a conversation; callers apply staleness filtering.
pub async fn list_typing(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<TypingIndicator>, ConfabError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT conversation_id, user_id, is_typing, updated_at
                 FROM typing_indicators
                 WHERE conversation_id = ?1
                 ORDER BY user_id ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], row_to_indicator)?;
            let mut indicators = Vec::new();
            for row in rows {
                indicators.push(row?);
            }
            Ok(indicators)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_indicator(row: &rusqlite::Row<'_>) -> Result<TypingIndicator, rusqlite::Error> {
    Ok(TypingIndicator {
        conversation_id: row.get(0)?,
        user_id: row.get(1)?,
        is_typing: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn row(user_id: &str, is_typing: bool, updated_at: i64) -> TypingIndicator {
        TypingIndicator {
            conversation_id: "c1".to_string(),
            user_id: user_id.to_string(),
            is_typing,
            updated_at,
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let (db, _dir) = setup_db().await;

        upsert_typing(&db, &row("u1", true, 1_000)).await.unwrap();
        upsert_typing(&db, &row("u1", false, 2_000)).await.unwrap();

        let stored = get_typing(&db, "c1", "u1").await.unwrap().unwrap();
        assert!(!stored.is_typing);
        assert_eq!(stored.updated_at, 2_000);

        let all = list_typing(&db, "c1").await.unwrap();
        assert_eq!(all.len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_row_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_typing(&db, "c1", "nobody").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_is_scoped_to_conversation() {
        let (db, _dir) = setup_db().await;
        upsert_typing(&db, &row("u1", true, 1_000)).await.unwrap();
        let other = TypingIndicator {
            conversation_id: "c2".to_string(),
            user_id: "u9".to_string(),
            is_typing: true,
            updated_at: 1_000,
        };
        upsert_typing(&db, &other).await.unwrap();

        let rows = list_typing(&db, "c1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "u1");
        db.close().await.unwrap();
    }
}
