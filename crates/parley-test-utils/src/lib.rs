// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides mock adapters and storage fixtures for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory message and account store with failure injection
//! - [`MockConnection`] - Live connection that records every pushed event
//! - [`TempStorage`] - SQLite storage in a temporary directory
//! - [`TestHarness`] - Full delivery stack plus gateway on an ephemeral port

pub mod harness;
pub mod memory_store;
pub mod mock_connection;
pub mod temp_storage;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::MemoryStore;
pub use mock_connection::MockConnection;
pub use temp_storage::TempStorage;
