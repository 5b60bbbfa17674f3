// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receipt/reaction document operations keyed by deterministic id.

use confab_core::{ConfabError, Receipt, ReceiptStatus};
use rusqlite::params;

use crate::database::Database;

/// A receipt/reaction document by id.
pub async fn get_receipt(db: &Database, id: &str) -> Result<Option<Receipt>, ConfabError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, message_id, conversation_id, user_id, status, emoji, updated_at
                 FROM receipts WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], row_to_receipt);
            match result {
                Ok(receipt) => Ok(Some(receipt)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Upsert a receipt/reaction document by id.
pub async fn upsert_receipt(db: &Database, receipt: &Receipt) -> Result<(), ConfabError> {
    let receipt = receipt.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO receipts (id, message_id, conversation_id, user_id, status, emoji, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                     conversation_id = excluded.conversation_id,
                     status = excluded.status,
                     emoji = excluded.emoji,
                     updated_at = excluded.updated_at",
                params![
                    receipt.id,
                    receipt.message_id,
                    receipt.conversation_id,
                    receipt.user_id,
                    receipt.status.map(|s| s.to_string()),
                    receipt.emoji,
                    receipt.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a receipt/reaction document. Returns whether a row existed.
pub async fn delete_receipt(db: &Database, id: &str) -> Result<bool, ConfabError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute("DELETE FROM receipts WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_receipt(row: &rusqlite::Row<'_>) -> Result<Receipt, rusqlite::Error> {
    let status: Option<String> = row.get(4)?;
    let status = status
        .map(|s| {
            s.parse::<ReceiptStatus>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;
    Ok(Receipt {
        id: row.get(0)?,
        message_id: row.get(1)?,
        conversation_id: row.get(2)?,
        user_id: row.get(3)?,
        status,
        emoji: row.get(5)?,
        updated_at: row.get(6)?,
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

    fn make_receipt(id: &str, status: Option<ReceiptStatus>, emoji: Option<&str>) -> Receipt {
        Receipt {
            id: id.to_string(),
            message_id: "m1".to_string(),
            conversation_id: Some("c1".to_string()),
            user_id: "u1".to_string(),
            status,
            emoji: emoji.map(str::to_string),
            updated_at: 1_000,
        }
    }

    #[tokio::test]
    async fn upsert_and_get_round_trips() {
        let (db, _dir) = setup_db().await;
        let receipt = make_receipt("r1", Some(ReceiptStatus::Delivered), None);

        upsert_receipt(&db, &receipt).await.unwrap();
        let stored = get_receipt(&db, "r1").await.unwrap().unwrap();
        assert_eq!(stored, receipt);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_overwrites_status_in_place() {
        let (db, _dir) = setup_db().await;
        upsert_receipt(&db, &make_receipt("r1", Some(ReceiptStatus::Delivered), None))
            .await
            .unwrap();

        let mut updated = make_receipt("r1", Some(ReceiptStatus::Read), None);
        updated.updated_at = 2_000;
        upsert_receipt(&db, &updated).await.unwrap();

        let stored = get_receipt(&db, "r1").await.unwrap().unwrap();
        assert_eq!(stored.status, Some(ReceiptStatus::Read));
        assert_eq!(stored.updated_at, 2_000);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reaction_documents_store_emoji_without_status() {
        let (db, _dir) = setup_db().await;
        upsert_receipt(&db, &make_receipt("r2", None, Some("👍")))
            .await
            .unwrap();

        let stored = get_receipt(&db, "r2").await.unwrap().unwrap();
        assert!(stored.status.is_none());
        assert_eq!(stored.emoji.as_deref(), Some("👍"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let (db, _dir) = setup_db().await;
        upsert_receipt(&db, &make_receipt("r1", None, Some("👍")))
            .await
            .unwrap();

        assert!(delete_receipt(&db, "r1").await.unwrap());
        assert!(!delete_receipt(&db, "r1").await.unwrap());
        assert!(get_receipt(&db, "r1").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
