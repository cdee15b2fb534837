// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persist-then-notify message delivery.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use parley_core::{LiveEvent, Message, MessageStore, NewMessage, ParleyError};

use crate::registry::ConnectionRegistry;

type Lane = Arc<Mutex<()>>;

/// Stores messages and pushes them to online receivers.
///
/// Sends to the same receiver are serialized through a per-receiver lane
/// held across persist and push, so a receiver sees live messages in the
/// order storage assigned their ids. Sends to different receivers run
/// fully in parallel.
pub struct DeliveryCoordinator {
    store: Arc<dyn MessageStore>,
    registry: Arc<ConnectionRegistry>,
    lanes: DashMap<String, Lane>,
}

impl DeliveryCoordinator {
    pub fn new(store: Arc<dyn MessageStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            store,
            registry,
            lanes: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Validate, persist and, if the receiver is online, push a message.
    ///
    /// Returns the stored message whether or not the live push landed.
    /// Fails only on validation or storage errors; in both cases nothing
    /// is pushed.
    pub async fn send(
        &self,
        sender: &str,
        receiver: &str,
        body: &str,
    ) -> Result<Message, ParleyError> {
        let new_message = NewMessage::new(sender, receiver, body);
        if let Err(e) = new_message.validate() {
            debug!(sender, receiver, error = %e, "rejected message");
            return Err(e);
        }

        let result = {
            let lane = LaneGuard::acquire(&self.lanes, receiver);
            let _turn = lane.lock().await;
            let result = self.store.persist_message(&new_message).await;
            if let Ok(message) = &result {
                self.push_live(message);
            }
            result
        };

        match &result {
            Ok(message) => debug!(id = message.id, sender, receiver, "message stored"),
            Err(e) => warn!(sender, receiver, error = %e, "failed to store message"),
        }
        result
    }

    fn push_live(&self, message: &Message) -> bool {
        let event = LiveEvent::NewMessage {
            message: message.clone(),
        };
        let delivered = self.registry.send_to(&message.receiver, &event);
        if delivered {
            debug!(id = message.id, receiver = %message.receiver, "delivered live");
        } else {
            debug!(id = message.id, receiver = %message.receiver, "not delivered live, stored only");
        }
        delivered
    }

    /// Number of receivers with a send in flight.
    pub fn active_lanes(&self) -> usize {
        self.lanes.len()
    }
}

/// A clone of one receiver's lane that drops the map entry once the last
/// user releases it, including when the owning future is cancelled.
struct LaneGuard<'a> {
    lanes: &'a DashMap<String, Lane>,
    receiver: &'a str,
    lane: Option<Lane>,
}

impl<'a> LaneGuard<'a> {
    fn acquire(lanes: &'a DashMap<String, Lane>, receiver: &'a str) -> Self {
        let lane = Arc::clone(lanes.entry(receiver.to_string()).or_default().value());
        Self {
            lanes,
            receiver,
            lane: Some(lane),
        }
    }

    /// Wait for this receiver's turn. `lane` is only emptied in `drop`.
    async fn lock(&self) -> Option<MutexGuard<'_, ()>> {
        Some(self.lane.as_ref()?.lock().await)
    }
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        drop(self.lane.take());
        // Entry access and removal share the shard lock, so nobody can
        // clone the lane between the count check and the removal.
        self.lanes
            .remove_if(self.receiver, |_, lane| Arc::strong_count(lane) == 1);
    }
}
