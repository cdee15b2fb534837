// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod connection;
pub mod storage;

pub use adapter::PluginAdapter;
pub use connection::Connection;
pub use storage::{AccountStore, MessageStore, StorageAdapter};
