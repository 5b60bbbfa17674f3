// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the EventStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use confab_config::model::StorageConfig;
use confab_core::{ConfabError, Event, EventStore, Receipt, StoredMessage, TypingIndicator};

use crate::database::Database;
use crate::queries;

/// SQLite-backed durable event store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules. The database is lazily opened on the first call to
/// [`initialize`](Self::initialize).
pub struct SqliteEventStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteEventStore {
    /// Create a new store with the given configuration.
    ///
    /// The database file is not opened until [`initialize`](Self::initialize)
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, applying PRAGMAs and the schema.
    pub async fn initialize(&self) -> Result<(), ConfabError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| ConfabError::Store {
            source: "store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite event store initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), ConfabError> {
        self.db()?.close().await
    }

    fn db(&self) -> Result<&Database, ConfabError> {
        self.db.get().ok_or_else(|| ConfabError::Store {
            source: "store not initialized -- call initialize() first".into(),
        })
    }

    /// Insert a message row on behalf of the external message write path.
    pub async fn insert_message(&self, message: &StoredMessage) -> Result<(), ConfabError> {
        queries::messages::insert_message(self.db()?, message).await
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn append_event(&self, event: &Event) -> Result<(), ConfabError> {
        queries::events::append_event(self.db()?, event).await
    }

    async fn events_since(
        &self,
        conversation_id: &str,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<Event>, ConfabError> {
        queries::events::events_since(self.db()?, conversation_id, since_ms, limit).await
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<StoredMessage>, ConfabError> {
        queries::messages::get_message(self.db()?, message_id).await
    }

    async fn upsert_typing(&self, indicator: &TypingIndicator) -> Result<(), ConfabError> {
        queries::typing::upsert_typing(self.db()?, indicator).await
    }

    async fn get_typing(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<Option<TypingIndicator>, ConfabError> {
        queries::typing::get_typing(self.db()?, conversation_id, user_id).await
    }

    async fn list_typing(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<TypingIndicator>, ConfabError> {
        queries::typing::list_typing(self.db()?, conversation_id).await
    }

    async fn get_receipt(&self, id: &str) -> Result<Option<Receipt>, ConfabError> {
        queries::receipts::get_receipt(self.db()?, id).await
    }

    async fn upsert_receipt(&self, receipt: &Receipt) -> Result<(), ConfabError> {
        queries::receipts::upsert_receipt(self.db()?, receipt).await
    }

    async fn delete_receipt(&self, id: &str) -> Result<bool, ConfabError> {
        queries::receipts::delete_receipt(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::EventKind;
    use tempfile::tempdir;

    async fn setup_store() -> (SqliteEventStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
        };
        let store = SqliteEventStore::new(config);
        store.initialize().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn uninitialized_store_errors() {
        let store = SqliteEventStore::new(StorageConfig {
            database_path: "unused.db".to_string(),
        });
        let err = store.events_since("c1", 0, 50).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let (store, _dir) = setup_store().await;
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn full_event_flow_through_the_trait() {
        let (store, _dir) = setup_store().await;

        store
            .insert_message(&StoredMessage {
                id: "m1".to_string(),
                conversation_id: "c1".to_string(),
                sender_id: "u1".to_string(),
                created_at: 900,
            })
            .await
            .unwrap();

        store
            .append_event(&Event {
                id: "e1".to_string(),
                conversation_id: "c1".to_string(),
                kind: EventKind::Message,
                created_at: 1_000,
                payload: serde_json::json!({"message_id": "m1"}),
            })
            .await
            .unwrap();

        let page = store.events_since("c1", 999, 50).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].kind, EventKind::Message);

        let message = store.get_message("m1").await.unwrap().unwrap();
        assert_eq!(message.conversation_id, "c1");

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn typing_and_receipt_flow_through_the_trait() {
        let (store, _dir) = setup_store().await;

        let indicator = TypingIndicator {
            conversation_id: "c1".to_string(),
            user_id: "u1".to_string(),
            is_typing: true,
            updated_at: 1_000,
        };
        store.upsert_typing(&indicator).await.unwrap();
        assert_eq!(
            store.get_typing("c1", "u1").await.unwrap().unwrap(),
            indicator
        );
        assert_eq!(store.list_typing("c1").await.unwrap().len(), 1);

        let receipt = Receipt {
            id: "r1".to_string(),
            message_id: "m1".to_string(),
            conversation_id: Some("c1".to_string()),
            user_id: "u2".to_string(),
            status: None,
            emoji: Some("👍".to_string()),
            updated_at: 1_000,
        };
        store.upsert_receipt(&receipt).await.unwrap();
        assert!(store.get_receipt("r1").await.unwrap().is_some());
        assert!(store.delete_receipt("r1").await.unwrap());
        assert!(store.get_receipt("r1").await.unwrap().is_none());

        store.close().await.unwrap();
    }
}
