// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use parley_config::model::StorageConfig;
use parley_core::{
    AccountStore, Credentials, HealthStatus, Message, MessageStore, NewMessage, ParleyError,
    PluginAdapter, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create storage over an already-open database.
    pub fn with_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, ParleyError> {
        self.db.get().ok_or_else(|| {
            ParleyError::storage("storage not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ParleyError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| ParleyError::storage("storage already initialized"))?;
        info!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStorage {
    async fn persist_message(&self, msg: &NewMessage) -> Result<Message, ParleyError> {
        queries::messages::insert_message(self.db()?, msg).await
    }

    async fn conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, ParleyError> {
        queries::messages::get_conversation(self.db()?, user_a, user_b, limit).await
    }

    async fn delete_message(&self, id: i64, sender: &str) -> Result<bool, ParleyError> {
        queries::messages::delete_message(self.db()?, id, sender).await
    }
}

#[async_trait]
impl AccountStore for SqliteStorage {
    async fn create_account(&self, credentials: &Credentials) -> Result<(), ParleyError> {
        if queries::users::create_user(self.db()?, credentials).await? {
            Ok(())
        } else {
            Err(ParleyError::AccountExists {
                username: credentials.username.clone(),
            })
        }
    }

    async fn lookup_credentials(
        &self,
        username: &str,
    ) -> Result<Option<Credentials>, ParleyError> {
        queries::users::get_credentials(self.db()?, username).await
    }

    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<String>, ParleyError> {
        queries::users::search_usernames(self.db()?, query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(storage.name(), "sqlite");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn operations_before_initialize_are_storage_errors() {
        let storage = SqliteStorage::new(make_config("/nonexistent/never-opened.db"));
        let err = storage
            .persist_message(&NewMessage::new("a", "b", "hi"))
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn duplicate_account_maps_to_account_exists() {
        let storage = SqliteStorage::with_database(
            make_config(":memory:"),
            Database::open_in_memory().await.unwrap(),
        );
        storage
            .create_account(&Credentials::new("alice", "pw"))
            .await
            .unwrap();
        let err = storage
            .create_account(&Credentials::new("alice", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::AccountExists { username } if username == "alice"));
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        storage
            .persist_message(&NewMessage::new("bob", "alice", "bye"))
            .await
            .unwrap();
        storage.shutdown().await.unwrap();
        storage.close().await.unwrap();
    }
}
