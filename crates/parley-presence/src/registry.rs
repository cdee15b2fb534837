// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from online users to their live connection.
//!
//! The registry holds at most one connection per identity. A later
//! registration replaces the earlier one and hands the displaced
//! connection back to the caller, which is responsible for closing it.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use parley_core::{Connection, LiveEvent};

/// Concurrent map of identity to live connection.
///
/// All access goes through the methods below. The map is sharded, and
/// every operation on one identity takes that identity's shard lock, so
/// register, unregister and push for the same user are linearized.
pub struct ConnectionRegistry {
    connections: DashMap<String, Arc<dyn Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Insert or replace the connection for `identity`.
    ///
    /// Returns the connection that was displaced, if any. The displaced
    /// connection is not closed here.
    pub fn register(
        &self,
        identity: &str,
        connection: Arc<dyn Connection>,
    ) -> Option<Arc<dyn Connection>> {
        let connection_id = connection.id().to_string();
        let previous = self.connections.insert(identity.to_string(), connection);
        match &previous {
            Some(prev) => info!(
                user = identity,
                connection_id = %connection_id,
                replaced = prev.id(),
                "connection replaced"
            ),
            None => debug!(user = identity, connection_id = %connection_id, "connection registered"),
        }
        previous
    }

    /// Remove whatever connection is registered for `identity`.
    ///
    /// Returns `true` if an entry was removed. Absent identities are a no-op.
    pub fn unregister(&self, identity: &str) -> bool {
        let removed = self.connections.remove(identity).is_some();
        if removed {
            debug!(user = identity, "connection unregistered");
        }
        removed
    }

    /// Remove the entry for `identity` only if it still points at
    /// `connection_id`.
    ///
    /// A session that was superseded uses this on exit so it cannot evict
    /// the connection that replaced it.
    pub fn unregister_connection(&self, identity: &str, connection_id: &str) -> bool {
        let removed = self
            .connections
            .remove_if(identity, |_, current| current.id() == connection_id)
            .is_some();
        if removed {
            debug!(user = identity, connection_id, "connection unregistered");
        }
        removed
    }

    /// The live connection for `identity`, if the user is online.
    pub fn lookup(&self, identity: &str) -> Option<Arc<dyn Connection>> {
        self.connections
            .get(identity)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn is_online(&self, identity: &str) -> bool {
        self.connections.contains_key(identity)
    }

    /// Push `event` to the connection registered for `identity`.
    ///
    /// Returns `false` when the user is offline or the connection refused
    /// the event. Neither case is an error.
    pub fn send_to(&self, identity: &str, event: &LiveEvent) -> bool {
        let Some(entry) = self.connections.get(identity) else {
            return false;
        };
        match entry.value().push(event) {
            Ok(()) => true,
            Err(e) => {
                debug!(user = identity, connection_id = entry.value().id(), error = %e, "push refused");
                false
            }
        }
    }

    /// Number of online users.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Identities with a registered connection, sorted.
    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self
            .connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        users.sort();
        users
    }

    /// Close and remove every registered connection. Used on shutdown.
    ///
    /// Returns how many connections were closed.
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        self.connections.retain(|_, connection| {
            connection.close();
            closed += 1;
            false
        });
        if closed > 0 {
            info!(count = closed, "closed all live connections");
        }
        closed
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Message;
    use parley_test_utils::MockConnection;

    fn event(id: i64, receiver: &str) -> LiveEvent {
        LiveEvent::NewMessage {
            message: Message {
                id,
                sender: "bob".into(),
                receiver: receiver.into(),
                body: "hi".into(),
                sent_at: Default::default(),
            },
        }
    }

    fn conn(id: &str) -> Arc<MockConnection> {
        Arc::new(MockConnection::with_id(id))
    }

    #[test]
    fn register_replaces_and_returns_previous() {
        let registry = ConnectionRegistry::new();
        let c1 = conn("c1");
        let c2 = conn("c2");

        assert!(registry.register("alice", c1.clone()).is_none());
        let previous = registry.register("alice", c2.clone()).unwrap();
        assert_eq!(previous.id(), "c1");
        assert_eq!(registry.lookup("alice").unwrap().id(), "c2");
        assert_eq!(registry.len(), 1);
        // Register alone never closes the displaced connection.
        assert!(c1.is_open());
    }

    #[test]
    fn replaced_connection_receives_nothing() {
        let registry = ConnectionRegistry::new();
        let c1 = conn("c1");
        let c2 = conn("c2");
        registry.register("alice", c1.clone());
        registry.register("alice", c2.clone());

        assert!(registry.send_to("alice", &event(1, "alice")));
        assert_eq!(c1.push_count(), 0);
        assert_eq!(c2.push_count(), 1);
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.unregister("ghost"));

        registry.register("alice", conn("c1"));
        assert!(registry.unregister("alice"));
        assert!(!registry.unregister("alice"));
        assert!(registry.lookup("alice").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_connection_ignores_stale_id() {
        let registry = ConnectionRegistry::new();
        registry.register("alice", conn("c1"));
        registry.register("alice", conn("c2"));

        assert!(!registry.unregister_connection("alice", "c1"));
        assert_eq!(registry.lookup("alice").unwrap().id(), "c2");
        assert!(registry.unregister_connection("alice", "c2"));
        assert!(!registry.is_online("alice"));
    }

    #[test]
    fn send_to_offline_user_is_not_delivered() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send_to("nobody", &event(1, "nobody")));
    }

    #[test]
    fn send_to_refusing_connection_is_not_delivered() {
        let registry = ConnectionRegistry::new();
        let c = conn("c1");
        c.reject_pushes(true);
        registry.register("alice", c.clone());
        assert!(!registry.send_to("alice", &event(1, "alice")));
        // A refused push leaves the registration in place.
        assert!(registry.is_online("alice"));
    }

    #[test]
    fn send_to_closed_connection_is_not_delivered() {
        let registry = ConnectionRegistry::new();
        let c = conn("c1");
        registry.register("alice", c.clone());
        c.close();
        assert!(!registry.send_to("alice", &event(1, "alice")));
    }

    #[test]
    fn online_users_are_sorted() {
        let registry = ConnectionRegistry::new();
        registry.register("carol", conn("c3"));
        registry.register("alice", conn("c1"));
        registry.register("bob", conn("c2"));
        assert_eq!(registry.online_users(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn close_all_closes_and_clears() {
        let registry = ConnectionRegistry::new();
        let a = conn("c1");
        let b = conn("c2");
        registry.register("alice", a.clone());
        registry.register("bob", b.clone());

        assert_eq!(registry.close_all(), 2);
        assert!(registry.is_empty());
        assert!(!a.is_open());
        assert!(!b.is_open());
        assert_eq!(registry.close_all(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_leave_one_entry_per_user() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let user = format!("user{}", i % 8);
                registry.register(&user, conn(&format!("c{i}")));
                registry.send_to(&user, &event(i, &user));
                if i % 3 == 0 {
                    registry.unregister(&user);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(registry.len() <= 8);
        for user in registry.online_users() {
            assert!(registry.lookup(&user).is_some());
        }
    }

    mod model {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        #[derive(Debug, Clone)]
        enum Op {
            Register(u8, u8),
            Unregister(u8),
            UnregisterConnection(u8, u8),
            SendTo(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..4, 0u8..6).prop_map(|(u, c)| Op::Register(u, c)),
                (0u8..4).prop_map(Op::Unregister),
                (0u8..4, 0u8..6).prop_map(|(u, c)| Op::UnregisterConnection(u, c)),
                (0u8..4).prop_map(Op::SendTo),
            ]
        }

        proptest! {
            #[test]
            fn registry_matches_last_writer_wins_model(ops in proptest::collection::vec(op(), 1..64)) {
                let registry = ConnectionRegistry::new();
                let mut model: HashMap<String, String> = HashMap::new();

                for op in ops {
                    match op {
                        Op::Register(u, c) => {
                            let user = format!("u{u}");
                            let id = format!("c{c}");
                            let previous = registry.register(&user, conn(&id));
                            let expected = model.insert(user, id);
                            prop_assert_eq!(previous.map(|p| p.id().to_string()), expected);
                        }
                        Op::Unregister(u) => {
                            let user = format!("u{u}");
                            prop_assert_eq!(registry.unregister(&user), model.remove(&user).is_some());
                        }
                        Op::UnregisterConnection(u, c) => {
                            let user = format!("u{u}");
                            let id = format!("c{c}");
                            let matches = model.get(&user) == Some(&id);
                            if matches {
                                model.remove(&user);
                            }
                            prop_assert_eq!(registry.unregister_connection(&user, &id), matches);
                        }
                        Op::SendTo(u) => {
                            let user = format!("u{u}");
                            prop_assert_eq!(
                                registry.send_to(&user, &event(1, &user)),
                                model.contains_key(&user)
                            );
                        }
                    }
                    prop_assert_eq!(registry.len(), model.len());
                }

                for (user, id) in &model {
                    let current = registry.lookup(user);
                    prop_assert_eq!(current.map(|c| c.id().to_string()), Some(id.clone()));
                }
            }
        }
    }
}
