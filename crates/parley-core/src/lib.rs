// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley messaging server.
//!
//! This crate provides the error type, domain types, and the adapter traits
//! that separate the delivery core from storage and transport backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ParleyError;
pub use types::{Credentials, HealthStatus, LiveEvent, Message, NewMessage};

pub use traits::{AccountStore, Connection, MessageStore, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parley_error_has_all_variants() {
        let _config = ParleyError::Config("test".into());
        let _validation = ParleyError::validation("body", "must not be empty");
        let _storage = ParleyError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _exists = ParleyError::AccountExists {
            username: "alice".into(),
        };
        let _channel = ParleyError::Channel {
            message: "test".into(),
            source: None,
        };
        let _internal = ParleyError::Internal("test".into());
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_message_store<T: MessageStore>() {}
        fn _assert_account_store<T: AccountStore>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_connection<T: Connection>() {}
    }
}
