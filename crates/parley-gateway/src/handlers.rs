// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use parley_core::{Credentials, HealthStatus, Message};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::server::GatewayState;

/// Results returned by user search when no limit is given.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;
/// Upper bound on user search results.
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub online_users: usize,
}

/// Response body for account creation and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub username: String,
}

/// Request body for POST /v1/messages.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub sender: String,
    pub receiver: String,
    pub body: String,
}

/// Query for GET /v1/conversations.
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub user_a: String,
    pub user_b: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response body for GET /v1/conversations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub messages: Vec<Message>,
}

/// Query for DELETE /v1/messages/{id}.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub username: String,
}

/// Query for GET /v1/users/search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response body for GET /v1/users/search.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub users: Vec<String>,
}

/// Response body for GET /v1/presence/{username}.
#[derive(Debug, Serialize, Deserialize)]
pub struct PresenceResponse {
    pub username: String,
    pub online: bool,
}

/// GET /health
///
/// Reports storage health, uptime and how many users are online. Answers
/// 503 when storage is unhealthy so load balancers stop routing here.
pub async fn get_health(State(state): State<GatewayState>) -> impl IntoResponse {
    let (status, code) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => ("ok", StatusCode::OK),
        Ok(HealthStatus::Degraded(reason)) => {
            tracing::warn!(%reason, "storage degraded");
            ("degraded", StatusCode::OK)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::warn!(%reason, "storage unhealthy");
            ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
            online_users: state.registry.len(),
        }),
    )
}

/// POST /v1/accounts
pub async fn post_accounts(
    State(state): State<GatewayState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    credentials.validate()?;
    state.storage.create_account(&credentials).await?;
    tracing::info!(user = %credentials.username, "account created");
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            username: credentials.username,
        }),
    ))
}

/// POST /v1/login
///
/// Unknown user and wrong password are indistinguishable to the caller.
pub async fn post_login(
    State(state): State<GatewayState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<AccountResponse>, ApiError> {
    credentials.validate()?;
    match state
        .storage
        .lookup_credentials(&credentials.username)
        .await?
    {
        Some(stored) if stored.password == credentials.password => Ok(Json(AccountResponse {
            username: stored.username,
        })),
        _ => {
            tracing::debug!(user = %credentials.username, "login rejected");
            Err(ApiError::unauthorized("invalid username or password"))
        }
    }
}

/// POST /v1/messages
///
/// Stores the message and pushes it to the receiver if they are online.
/// The response is the same whether or not the live push happened.
pub async fn post_messages(
    State(state): State<GatewayState>,
    ApiJson(request): ApiJson<SendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .coordinator
        .send(&request.sender, &request.receiver, &request.body)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /v1/conversations?user_a=..&user_b=..&limit=..
///
/// Both directions of a conversation, oldest first.
pub async fn get_conversation(
    State(state): State<GatewayState>,
    ApiQuery(query): ApiQuery<ConversationQuery>,
) -> Result<Json<ConversationResponse>, ApiError> {
    if query.user_a.trim().is_empty() || query.user_b.trim().is_empty() {
        return Err(ApiError::bad_request("user_a and user_b are required"));
    }
    if matches!(query.limit, Some(limit) if limit < 1) {
        return Err(ApiError::bad_request("limit must be at least 1"));
    }
    let messages = state
        .storage
        .conversation(&query.user_a, &query.user_b, query.limit)
        .await?;
    Ok(Json(ConversationResponse { messages }))
}

/// DELETE /v1/messages/{id}?username=..
///
/// Only the sender may delete a message. Deleting someone else's message
/// looks the same as deleting one that does not exist.
pub async fn delete_message(
    State(state): State<GatewayState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<DeleteQuery>,
) -> Result<StatusCode, ApiError> {
    if query.username.trim().is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if state.storage.delete_message(id, &query.username).await? {
        tracing::debug!(id, user = %query.username, "message deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("message not found"))
    }
}

/// GET /v1/users/search?q=..&limit=..
pub async fn search_users(
    State(state): State<GatewayState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    let users = state.storage.search_users(query.q.trim(), limit).await?;
    Ok(Json(SearchResponse { users }))
}

/// GET /v1/presence/{username}
pub async fn get_presence(
    State(state): State<GatewayState>,
    Path(username): Path<String>,
) -> Json<PresenceResponse> {
    let online = state.registry.is_online(&username);
    Json(PresenceResponse { username, online })
}
