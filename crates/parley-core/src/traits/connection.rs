// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live connection trait for transports that push events to one client.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::LiveEvent;

/// One open, server-to-client channel.
///
/// The transport resource behind a connection is owned by the session that
/// created it; registries only hold shared handles.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Unique id of this connection, distinct across reconnects of the same user.
    fn id(&self) -> &str;

    /// Queues an event for the client without blocking.
    ///
    /// Fails if the connection is closed or its outbound queue is full.
    fn push(&self, event: &LiveEvent) -> Result<(), ParleyError>;

    /// Closes the connection. Calling this more than once is harmless.
    fn close(&self);

    /// Whether the connection still accepts pushes.
    fn is_open(&self) -> bool;

    /// Resolves once the connection has been closed by anyone.
    async fn closed(&self);
}
