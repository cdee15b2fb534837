// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles temp SQLite storage, a connection registry, a
//! delivery coordinator and the gateway state that ties them together.
//! [`TestHarness::spawn_server`] serves the gateway on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio_util::sync::CancellationToken;

use parley_core::{AccountStore, Credentials, MessageStore, ParleyError, StorageAdapter};
use parley_gateway::GatewayState;
use parley_presence::{ConnectionRegistry, DeliveryCoordinator};
use parley_storage::SqliteStorage;

use crate::temp_storage::TempStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    accounts: Vec<Credentials>,
    outbound_buffer: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            accounts: Vec::new(),
            outbound_buffer: 64,
        }
    }

    /// Create an account before the harness is returned.
    pub fn with_account(mut self, username: &str, password: &str) -> Self {
        self.accounts.push(Credentials::new(username, password));
        self
    }

    /// Capacity of each live connection's outbound queue.
    pub fn with_outbound_buffer(mut self, capacity: usize) -> Self {
        self.outbound_buffer = capacity;
        self
    }

    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let temp = TempStorage::new().await?;
        for credentials in &self.accounts {
            temp.storage.create_account(credentials).await?;
        }

        let registry = Arc::new(ConnectionRegistry::new());
        let store: Arc<dyn MessageStore> = temp.storage.clone();
        let coordinator = Arc::new(DeliveryCoordinator::new(store, Arc::clone(&registry)));

        Ok(TestHarness {
            storage: Arc::clone(&temp.storage),
            registry,
            coordinator,
            shutdown: CancellationToken::new(),
            outbound_buffer: self.outbound_buffer,
            _temp: temp,
        })
    }
}

/// A complete delivery stack over a throwaway database.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub registry: Arc<ConnectionRegistry>,
    pub coordinator: Arc<DeliveryCoordinator>,
    /// Cancelled when the harness is dropped.
    pub shutdown: CancellationToken,
    outbound_buffer: usize,
    _temp: TempStorage,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Gateway state sharing this harness's storage, registry and shutdown.
    pub fn state(&self) -> GatewayState {
        let storage: Arc<dyn StorageAdapter> = self.storage.clone();
        GatewayState {
            storage,
            coordinator: Arc::clone(&self.coordinator),
            registry: Arc::clone(&self.registry),
            outbound_buffer: self.outbound_buffer,
            shutdown: self.shutdown.clone(),
            start_time: Instant::now(),
        }
    }

    /// Router for in-process requests with `tower::ServiceExt::oneshot`.
    pub fn router(&self) -> Router {
        parley_gateway::build_router(self.state())
    }

    /// Serve the gateway on `127.0.0.1` with an OS-assigned port.
    pub async fn spawn_server(&self) -> Result<SocketAddr, ParleyError> {
        let listener = parley_gateway::bind("127.0.0.1", 0).await?;
        let addr = listener
            .local_addr()
            .map_err(|e| ParleyError::Internal(format!("listener has no address: {e}")))?;
        let state = self.state();
        tokio::spawn(async move {
            if let Err(e) = parley_gateway::serve(listener, state).await {
                eprintln!("test gateway failed: {e}");
            }
        });
        Ok(addr)
    }

    /// Wait until `username` has a registered live connection.
    pub async fn wait_online(&self, username: &str) -> bool {
        for _ in 0..200 {
            if self.registry.is_online(username) {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_accounts() {
        let harness = TestHarness::builder()
            .with_account("alice", "pw")
            .build()
            .await
            .unwrap();
        let found = harness.storage.lookup_credentials("alice").await.unwrap();
        assert_eq!(found.unwrap().password, "pw");
        assert!(harness.registry.is_empty());
    }

    #[tokio::test]
    async fn harness_delivers_through_coordinator() {
        let harness = TestHarness::builder().build().await.unwrap();
        let message = harness.coordinator.send("bob", "alice", "hi").await.unwrap();
        assert_eq!(message.id, 1);
        assert_eq!(harness.state().outbound_buffer, 64);
    }
}
