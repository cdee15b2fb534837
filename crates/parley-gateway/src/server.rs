// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use parley_core::{ParleyError, StorageAdapter};
use parley_presence::{ConnectionRegistry, DeliveryCoordinator};

use crate::{handlers, ws};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Accounts, history and health.
    pub storage: Arc<dyn StorageAdapter>,
    /// Persist-then-notify path for new messages.
    pub coordinator: Arc<DeliveryCoordinator>,
    /// Who is online right now.
    pub registry: Arc<ConnectionRegistry>,
    /// Capacity of each live connection's outbound queue.
    pub outbound_buffer: usize,
    /// Fired once on server shutdown; ends every live session.
    pub shutdown: CancellationToken,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Build the router with every route and layer attached.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/accounts", post(handlers::post_accounts))
        .route("/v1/login", post(handlers::post_login))
        .route("/v1/messages", post(handlers::post_messages))
        .route("/v1/messages/{id}", delete(handlers::delete_message))
        .route("/v1/conversations", get(handlers::get_conversation))
        .route("/v1/users/search", get(handlers::search_users))
        .route("/v1/presence/{username}", get(handlers::get_presence))
        .route("/ws/{username}", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the gateway's TCP listener.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ParleyError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|e| ParleyError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serve until `state.shutdown` fires, then drain in-flight requests.
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<(), ParleyError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("gateway listening on {addr}");
    }
    let shutdown = state.shutdown.clone();

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ParleyError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
