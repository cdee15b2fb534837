// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock live connection for deterministic testing.
//!
//! `MockConnection` implements `Connection`, capturing pushed events for
//! assertion and letting tests simulate a full outbound queue.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use parley_core::{Connection, LiveEvent, Message, ParleyError};

/// A recording connection.
pub struct MockConnection {
    id: String,
    pushed: Mutex<Vec<LiveEvent>>,
    reject_pushes: AtomicBool,
    closed: CancellationToken,
}

impl MockConnection {
    /// Create an open connection with a random id.
    pub fn new() -> Self {
        Self::with_id(format!("mock-conn-{}", uuid::Uuid::new_v4()))
    }

    /// Create an open connection with a fixed id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pushed: Mutex::new(Vec::new()),
            reject_pushes: AtomicBool::new(false),
            closed: CancellationToken::new(),
        }
    }

    /// Make subsequent pushes fail as if the outbound queue were full.
    pub fn reject_pushes(&self, reject: bool) {
        self.reject_pushes.store(reject, Ordering::SeqCst);
    }

    /// All events accepted so far, in push order.
    pub fn pushed(&self) -> Vec<LiveEvent> {
        self.pushed.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Messages carried by the accepted events, in push order.
    pub fn pushed_messages(&self) -> Vec<Message> {
        self.pushed()
            .into_iter()
            .map(|event| match event {
                LiveEvent::NewMessage { message } => message,
            })
            .collect()
    }

    /// Number of events accepted so far.
    pub fn push_count(&self) -> usize {
        self.pushed.lock().map(|p| p.len()).unwrap_or_default()
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn id(&self) -> &str {
        &self.id
    }

    fn push(&self, event: &LiveEvent) -> Result<(), ParleyError> {
        if self.closed.is_cancelled() {
            return Err(ParleyError::Channel {
                message: "connection closed".to_string(),
                source: None,
            });
        }
        if self.reject_pushes.load(Ordering::SeqCst) {
            return Err(ParleyError::Channel {
                message: "outbound queue full".to_string(),
                source: None,
            });
        }
        self.pushed
            .lock()
            .map_err(|_| ParleyError::Internal("mock connection poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }

    fn close(&self) {
        self.closed.cancel();
    }

    fn is_open(&self) -> bool {
        !self.closed.is_cancelled()
    }

    async fn closed(&self) {
        self.closed.cancelled().await;
    }
}
