// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: the persistence collaborators consumed by the delivery core
//! and the HTTP gateway.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Credentials, Message, NewMessage};

/// Durable, append-only message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Durably inserts a message, assigning its `id` and `sent_at`.
    ///
    /// Ids are strictly increasing in insertion order.
    async fn persist_message(&self, msg: &NewMessage) -> Result<Message, ParleyError>;

    /// Returns the messages exchanged between two users in either direction,
    /// oldest first. `limit` keeps the first `limit` messages.
    async fn conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, ParleyError>;

    /// Deletes a message if `sender` authored it. Returns whether a row was removed.
    async fn delete_message(&self, id: i64, sender: &str) -> Result<bool, ParleyError>;
}

/// Account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates an account. Fails with [`ParleyError::AccountExists`] on a taken username.
    async fn create_account(&self, credentials: &Credentials) -> Result<(), ParleyError>;

    /// Looks up the stored credentials for `username`.
    async fn lookup_credentials(&self, username: &str)
    -> Result<Option<Credentials>, ParleyError>;

    /// Case-insensitive substring search over usernames, ordered by username.
    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<String>, ParleyError>;
}

/// A full storage backend: lifecycle plus both stores.
#[async_trait]
pub trait StorageAdapter: PluginAdapter + MessageStore + AccountStore {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ParleyError>;
}
