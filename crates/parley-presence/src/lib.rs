// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence-aware delivery for Parley.
//!
//! - [`ConnectionRegistry`] maps each online user to their single live
//!   connection.
//! - [`DeliveryCoordinator`] persists a message, then pushes it to the
//!   receiver when they are online.
//! - [`PresenceSession`] ties one client connection's lifetime to its
//!   registry entry.
//!
//! Persistence always comes first. Live delivery is best effort and a
//! missed push never fails a send.

pub mod coordinator;
pub mod registry;
pub mod session;

pub use coordinator::DeliveryCoordinator;
pub use registry::ConnectionRegistry;
pub use session::{CloseReason, InboundSignal, PresenceSession, SessionState};
