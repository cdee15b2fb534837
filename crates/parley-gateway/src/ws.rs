// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receive-only live channel over WebSocket.
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "new_message", "message": {"id": 1, "sender": "bob", "receiver": "alice", "body": "hello", "sentAt": "..."}}
//! ```
//!
//! Frames from the client only count as liveness. Messages are sent with
//! `POST /v1/messages`, never over this socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use parley_core::{Connection, LiveEvent, ParleyError};
use parley_presence::{InboundSignal, PresenceSession};

use crate::error::ApiError;
use crate::server::GatewayState;

/// A live WebSocket as seen by the registry.
///
/// Pushes go into a bounded queue drained by a writer task, so a push
/// never waits on the network. A full queue refuses the event.
pub struct WsConnection {
    id: String,
    outbound: mpsc::Sender<String>,
    closed: CancellationToken,
}

impl WsConnection {
    pub fn new(outbound: mpsc::Sender<String>, closed: CancellationToken) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            outbound,
            closed,
        }
    }
}

fn channel_error(message: &str) -> ParleyError {
    ParleyError::Channel {
        message: message.to_string(),
        source: None,
    }
}

#[async_trait]
impl Connection for WsConnection {
    fn id(&self) -> &str {
        &self.id
    }

    fn push(&self, event: &LiveEvent) -> Result<(), ParleyError> {
        if self.closed.is_cancelled() {
            return Err(channel_error("connection closed"));
        }
        let frame = event.to_json()?;
        self.outbound.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => channel_error("outbound queue full"),
            TrySendError::Closed(_) => channel_error("connection closed"),
        })
    }

    fn close(&self) {
        self.closed.cancel();
    }

    fn is_open(&self) -> bool {
        !self.closed.is_cancelled() && !self.outbound.is_closed()
    }

    async fn closed(&self) {
        self.closed.cancelled().await;
    }
}

/// WebSocket upgrade handler for `GET /ws/{username}`.
///
/// Only existing accounts may open a live channel.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(username): Path<String>,
    State(state): State<GatewayState>,
) -> Result<Response, ApiError> {
    if state.storage.lookup_credentials(&username).await?.is_none() {
        return Err(ApiError::not_found(format!("unknown user `{username}`")));
    }
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, username, state)))
}

/// Run one live channel until either side ends it.
///
/// A writer task drains the outbound queue into the socket while the
/// presence session watches inbound frames for liveness.
async fn handle_socket(socket: WebSocket, username: String, state: GatewayState) {
    let (ws_sender, ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel::<String>(state.outbound_buffer.max(1));
    let closed = CancellationToken::new();
    let connection = Arc::new(WsConnection::new(tx, closed.clone()));

    let writer = tokio::spawn(write_frames(ws_sender, rx, closed));

    let inbound = ws_receiver.map(|frame| frame.map(classify));
    let session = PresenceSession::new(username, connection, Arc::clone(&state.registry));
    session.run(inbound, state.shutdown.clone()).await;

    if let Err(e) = writer.await {
        tracing::warn!(error = %e, "live writer task failed");
    }
}

/// Forward queued frames to the socket until the connection is closed.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    closed: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = closed.cancelled() => break,
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        tracing::debug!(error = %e, "live write failed");
                        closed.cancel();
                        return;
                    }
                }
                None => break,
            },
        }
    }
    // Best effort; the peer may already be gone.
    let _ = sink.send(Message::Close(None)).await;
}

fn classify(frame: Message) -> InboundSignal {
    match frame {
        Message::Text(_) | Message::Binary(_) => InboundSignal::Data,
        Message::Ping(_) | Message::Pong(_) => InboundSignal::Keepalive,
        Message::Close(_) => InboundSignal::Close,
    }
}
