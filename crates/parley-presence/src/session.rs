// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection presence supervision.
//!
//! A [`PresenceSession`] binds one live connection to one user. It moves
//! through `Connecting -> Active -> Closed`: activation registers the
//! connection, and every way out of the active loop deregisters it.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use parley_core::Connection;

use crate::registry::ConnectionRegistry;

/// Lifecycle state of a [`PresenceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// What the transport reported, reduced to what presence cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundSignal {
    /// Ping, pong or any other liveness frame.
    Keepalive,
    /// Application data from the client. The live channel is receive-only,
    /// so this is observed and dropped.
    Data,
    /// The client asked to close.
    Close,
}

/// Why a session's active loop ended.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CloseReason {
    /// The client sent a close frame.
    ClientClosed,
    /// The inbound stream ended without a close frame.
    Disconnected,
    /// Reading from the transport failed.
    TransportError(String),
    /// The connection was closed from our side, e.g. replaced by a newer
    /// session or its writer failed.
    ConnectionClosed,
    /// The server is shutting down.
    Shutdown,
}

pub struct PresenceSession {
    identity: String,
    connection: Arc<dyn Connection>,
    registry: Arc<ConnectionRegistry>,
    state: SessionState,
}

impl PresenceSession {
    pub fn new(
        identity: impl Into<String>,
        connection: Arc<dyn Connection>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            identity: identity.into(),
            connection,
            registry,
            state: SessionState::Connecting,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Register the connection and enter `Active`.
    ///
    /// Any connection this one replaces is closed so only one session per
    /// user receives live traffic. Does nothing outside `Connecting`.
    pub fn activate(&mut self) {
        if self.state != SessionState::Connecting {
            return;
        }
        let previous = self
            .registry
            .register(&self.identity, Arc::clone(&self.connection));
        if let Some(previous) = previous
            && previous.id() != self.connection.id()
        {
            previous.close();
        }
        self.state = SessionState::Active;
        info!(
            user = %self.identity,
            connection_id = self.connection.id(),
            "session active"
        );
    }

    /// Close the connection and remove it from the registry.
    ///
    /// Idempotent. Only this session's own connection is deregistered, so a
    /// session closing after being replaced leaves its successor online.
    /// Returns `false` if the session was already closed.
    pub fn close(&mut self) -> bool {
        match self.state {
            SessionState::Closed => return false,
            SessionState::Active => {
                self.registry
                    .unregister_connection(&self.identity, self.connection.id());
            }
            SessionState::Connecting => {}
        }
        self.connection.close();
        self.state = SessionState::Closed;
        true
    }

    /// Activate, then wait until the transport ends, the connection is
    /// closed from our side, or `shutdown` fires. Always ends `Closed`.
    pub async fn run<S, E>(mut self, mut inbound: S, shutdown: CancellationToken) -> CloseReason
    where
        S: Stream<Item = Result<InboundSignal, E>> + Unpin,
        E: Display,
    {
        self.activate();
        let connection = Arc::clone(&self.connection);

        let reason = loop {
            tokio::select! {
                _ = shutdown.cancelled() => break CloseReason::Shutdown,
                _ = connection.closed() => break CloseReason::ConnectionClosed,
                signal = inbound.next() => match signal {
                    Some(Ok(InboundSignal::Keepalive)) => {
                        trace!(user = %self.identity, "keepalive");
                    }
                    Some(Ok(InboundSignal::Data)) => {
                        debug!(user = %self.identity, "ignoring inbound data on live channel");
                    }
                    Some(Ok(InboundSignal::Close)) => break CloseReason::ClientClosed,
                    Some(Err(e)) => {
                        warn!(user = %self.identity, error = %e, "live transport error");
                        break CloseReason::TransportError(e.to_string());
                    }
                    None => break CloseReason::Disconnected,
                },
            }
        };

        self.close();
        info!(
            user = %self.identity,
            connection_id = connection.id(),
            reason = %reason,
            "session closed"
        );
        reason
    }
}

impl Drop for PresenceSession {
    fn drop(&mut self) {
        self.close();
    }
}
