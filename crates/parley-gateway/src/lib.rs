// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP and WebSocket gateway.
//!
//! REST routes cover accounts, message submission, history, search and
//! presence. `GET /ws/{username}` opens the receive-only live channel:
//! each socket becomes a [`PresenceSession`](parley_presence::PresenceSession)
//! and new messages for that user are pushed down it as JSON envelopes.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod ws;

pub use error::ApiError;
pub use server::{GatewayState, bind, build_router, serve};
pub use ws::WsConnection;
