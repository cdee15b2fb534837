// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter.
//!
//! Assigns message ids sequentially and supports failure injection so
//! delivery tests can exercise the storage-failure path without SQLite.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};

use parley_core::{
    AccountStore, Credentials, HealthStatus, Message, MessageStore, NewMessage, ParleyError,
    PluginAdapter, StorageAdapter,
};

#[derive(Default)]
struct State {
    next_id: i64,
    messages: Vec<Message>,
    accounts: BTreeMap<String, String>,
}

/// Storage adapter backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
    persist_calls: AtomicUsize,
    persist_delay: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `persist_message` fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Sleep this long inside every `persist_message` before committing.
    pub fn set_persist_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.persist_delay.lock() {
            *slot = delay;
        }
    }

    /// Number of `persist_message` calls, including failed ones.
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored message in id order.
    pub fn messages(&self) -> Vec<Message> {
        self.state
            .lock()
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, ParleyError> {
        self.state
            .lock()
            .map_err(|_| ParleyError::storage("memory store poisoned"))
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("writes failing".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn persist_message(&self, msg: &NewMessage) -> Result<Message, ParleyError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.persist_delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ParleyError::storage("injected write failure"));
        }

        let mut state = self.lock()?;
        state.next_id += 1;
        let message = Message {
            id: state.next_id,
            sender: msg.sender.clone(),
            receiver: msg.receiver.clone(),
            body: msg.body.clone(),
            sent_at: Utc::now().trunc_subsecs(3),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, ParleyError> {
        let state = self.lock()?;
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        Ok(state
            .messages
            .iter()
            .filter(|m| {
                (m.sender == user_a && m.receiver == user_b)
                    || (m.sender == user_b && m.receiver == user_a)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_message(&self, id: i64, sender: &str) -> Result<bool, ParleyError> {
        let mut state = self.lock()?;
        let before = state.messages.len();
        state.messages.retain(|m| !(m.id == id && m.sender == sender));
        Ok(state.messages.len() != before)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, credentials: &Credentials) -> Result<(), ParleyError> {
        let mut state = self.lock()?;
        if state.accounts.contains_key(&credentials.username) {
            return Err(ParleyError::AccountExists {
                username: credentials.username.clone(),
            });
        }
        state
            .accounts
            .insert(credentials.username.clone(), credentials.password.clone());
        Ok(())
    }

    async fn lookup_credentials(
        &self,
        username: &str,
    ) -> Result<Option<Credentials>, ParleyError> {
        let state = self.lock()?;
        Ok(state
            .accounts
            .get(username)
            .map(|password| Credentials::new(username, password.clone())))
    }

    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<String>, ParleyError> {
        let state = self.lock()?;
        let needle = query.to_lowercase();
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state
            .accounts
            .keys()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStore {
    async fn initialize(&self) -> Result<(), ParleyError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}
