// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Opens SQLite storage, builds the connection registry and delivery
//! coordinator, and serves the gateway until SIGINT or SIGTERM. On the way
//! out every live connection is closed and the database is checkpointed.

use std::sync::Arc;
use std::time::Instant;

use parley_config::ParleyConfig;
use parley_config::model::LoggingConfig;
use parley_core::{MessageStore, ParleyError, StorageAdapter};
use parley_gateway::GatewayState;
use parley_presence::{ConnectionRegistry, DeliveryCoordinator};
use parley_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `parley serve` command.
pub async fn run_serve(config: ParleyConfig) -> Result<(), ParleyError> {
    init_tracing(&config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "starting parley serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let registry = Arc::new(ConnectionRegistry::new());
    let store: Arc<dyn MessageStore> = storage.clone();
    let coordinator = Arc::new(DeliveryCoordinator::new(store, Arc::clone(&registry)));

    let shutdown = shutdown::install_signal_handler();
    let state = GatewayState {
        storage: storage.clone(),
        coordinator,
        registry: Arc::clone(&registry),
        outbound_buffer: config.delivery.outbound_buffer,
        shutdown,
        start_time: Instant::now(),
    };

    let listener = parley_gateway::bind(&config.server.host, config.server.port).await?;
    let served = parley_gateway::serve(listener, state).await;

    registry.close_all();
    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    info!("parley stopped");
    served
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let level = logging.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={level},tower_http={level},warn")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
