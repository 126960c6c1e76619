use std::sync::Arc;

use {dashmap::DashMap, tracing::warn};

use crate::{ServerId, ServerRecord, TransportClient};

/// Concurrent id → record map of connected servers.
///
/// Every operation is atomic per key: readers always see either the old or
/// the new record, never a half-applied update.
#[derive(Debug, Default)]
pub struct ServerRegistry {
    servers: DashMap<ServerId, ServerRecord>,
}

impl ServerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &ServerId) -> Option<ServerRecord> {
        self.servers.get(id).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn contains(&self, id: &ServerId) -> bool {
        self.servers.contains_key(id)
    }

    /// Insert or replace the record stored under its id. Returns the
    /// previous record, if any.
    pub fn upsert(&self, record: ServerRecord) -> Option<ServerRecord> {
        self.servers.insert(record.id().clone(), record)
    }

    /// Remove a record. A missing id is logged, not an error.
    pub fn remove(&self, id: &ServerId) -> Option<ServerRecord> {
        let removed = self.servers.remove(id).map(|(_, record)| record);
        if removed.is_none() {
            warn!(server_id = %id, "remove: server not in registry");
        }
        removed
    }

    /// Remove the record under `id` only while it is still bound to
    /// `client`. A record replaced by a newer connection is left in place.
    pub fn remove_for_client(
        &self,
        id: &ServerId,
        client: &Arc<dyn TransportClient>,
    ) -> Option<ServerRecord> {
        self.servers
            .remove_if(id, |_, record| record.client().is(client))
            .map(|(_, record)| record)
    }

    /// Apply `f` to the record under `id` while holding its shard lock and
    /// return the updated copy. `None` if the id is not registered.
    pub fn update(
        &self,
        id: &ServerId,
        f: impl FnOnce(&mut ServerRecord),
    ) -> Option<ServerRecord> {
        let mut entry = self.servers.get_mut(id)?;
        f(entry.value_mut());
        Some(entry.value().clone())
    }

    /// Snapshot of every record, in no particular order.
    #[must_use]
    pub fn list(&self) -> Vec<ServerRecord> {
        self.servers
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::thread;

    use {async_trait::async_trait, bytes::Bytes};

    use super::*;
    use crate::{ClientHandle, TransportError};

    struct NullClient;

    #[async_trait]
    impl TransportClient for NullClient {
        async fn send(&self, _frame: Bytes) -> Result<(), TransportError> {
            Ok(())
        }

        async fn stop_listening(&self) {}

        fn peer(&self) -> String {
            "null".into()
        }
    }

    fn record(id: &str, name: &str) -> ServerRecord {
        ServerRecord::new(
            ServerId::normalize(id),
            name,
            "localhost",
            10,
            ClientHandle::detached(),
        )
    }

    #[test]
    fn upsert_then_get_returns_record() {
        let registry = ServerRegistry::new();
        assert!(registry.upsert(record("smp", "Survival")).is_none());
        let got = registry.get(&ServerId::normalize("SMP")).unwrap();
        assert_eq!(got.name(), "Survival");
    }

    #[test]
    fn second_upsert_replaces() {
        let registry = ServerRegistry::new();
        let _ = registry.upsert(record("smp", "Survival"));
        let previous = registry.upsert(record("smp", "Survival 2")).unwrap();
        assert_eq!(previous.name(), "Survival");
        assert_eq!(
            registry.get(&ServerId::normalize("smp")).unwrap().name(),
            "Survival 2"
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_then_get_is_none() {
        let registry = ServerRegistry::new();
        for id in ["a", "b", "c"] {
            let _ = registry.upsert(record(id, id));
        }
        for id in ["a", "b", "c"] {
            let id = ServerId::normalize(id);
            assert!(registry.remove(&id).is_some());
            assert!(registry.get(&id).is_none());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn removing_absent_id_is_harmless() {
        let registry = ServerRegistry::new();
        assert!(registry.remove(&ServerId::normalize("ghost")).is_none());
    }

    #[test]
    fn remove_for_client_skips_a_newer_connection() {
        let registry = ServerRegistry::new();
        let old: Arc<dyn TransportClient> = Arc::new(NullClient);
        let new: Arc<dyn TransportClient> = Arc::new(NullClient);
        let id = ServerId::normalize("smp");
        let bound = |client: &Arc<dyn TransportClient>| {
            ServerRecord::new(id.clone(), "Survival", "localhost", 10, ClientHandle::new(client))
        };

        let _ = registry.upsert(bound(&old));
        let _ = registry.upsert(bound(&new));
        assert!(registry.remove_for_client(&id, &old).is_none());
        assert!(registry.get(&id).unwrap().client().is(&new));

        assert!(registry.remove_for_client(&id, &new).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn update_applies_in_place() {
        let registry = ServerRegistry::new();
        let _ = registry.upsert(record("smp", "Survival"));
        let updated = registry
            .update(&ServerId::normalize("smp"), |r| {
                r.player_joined("alice");
            })
            .unwrap();
        assert_eq!(updated.players_online(), 1);
        assert!(
            registry
                .update(&ServerId::normalize("nope"), |_| unreachable!())
                .is_none()
        );
    }

    #[test]
    fn list_returns_every_record() {
        let registry = ServerRegistry::new();
        for id in ["a", "b", "c"] {
            let _ = registry.upsert(record(id, id));
        }
        let mut ids: Vec<String> = registry.list().iter().map(|r| r.id().to_string()).collect();
        ids.sort();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn concurrent_joins_are_not_lost() {
        let registry = Arc::new(ServerRegistry::new());
        let _ = registry.upsert(record("smp", "Survival"));
        let id = ServerId::normalize("smp");

        let workers: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                let id = id.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        registry.update(&id, |r| {
                            r.player_joined(&format!("p{t}-{i}"));
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(registry.get(&id).unwrap().players_online(), 400);
    }
}
