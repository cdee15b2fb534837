// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite storage in a throwaway directory.

use std::sync::Arc;

use parley_config::model::StorageConfig;
use parley_core::{ParleyError, StorageAdapter};
use parley_storage::SqliteStorage;
use tempfile::TempDir;

/// Initialized [`SqliteStorage`] whose database file lives in a temporary
/// directory. The directory is removed when this value is dropped.
pub struct TempStorage {
    pub storage: Arc<SqliteStorage>,
    pub config: StorageConfig,
    _dir: TempDir,
}

impl TempStorage {
    /// Create and initialize a fresh database.
    pub async fn new() -> Result<Self, ParleyError> {
        let dir = tempfile::tempdir().map_err(ParleyError::storage)?;
        let config = StorageConfig {
            database_path: dir.path().join("parley.db").display().to_string(),
            wal_mode: true,
        };
        let storage = Arc::new(SqliteStorage::new(config.clone()));
        storage.initialize().await?;
        Ok(Self {
            storage,
            config,
            _dir: dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{MessageStore, NewMessage, PluginAdapter};

    #[tokio::test]
    async fn temp_storage_is_usable() {
        let temp = TempStorage::new().await.unwrap();
        let msg = temp
            .storage
            .persist_message(&NewMessage::new("bob", "alice", "hi"))
            .await
            .unwrap();
        assert!(msg.id > 0);
        assert_eq!(
            temp.storage.health_check().await.unwrap(),
            parley_core::HealthStatus::Healthy
        );
    }
}
