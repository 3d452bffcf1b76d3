use super::EntityStore;
use super::snapshot::{StoreSnapshot, SnapshotTerm};
use crate::core::{EntityId, Kind, StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub name: String,
    pub meta: BTreeMap<String, String>,
}

/// In-memory term store.
///
/// One `RwLock` guards every kind; each trait call takes the lock once, so a
/// single-field write is atomic with respect to other calls.
pub struct MemoryEntityStore {
    terms: RwLock<HashMap<Kind, BTreeMap<EntityId, TermRecord>>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self {
            terms: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulates an outage: every call fails with `StoreError::Unavailable`
    /// until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("entity store is offline".into()));
        }
        Ok(())
    }

    /// Number of terms of a kind, trashed ones included.
    pub async fn len(&self, kind: Kind) -> usize {
        let terms = self.terms.read().await;
        terms.get(&kind).map(BTreeMap::len).unwrap_or(0)
    }

    /// Raw record, for inspection in tooling and tests.
    pub async fn record(&self, kind: Kind, id: EntityId) -> Option<TermRecord> {
        let terms = self.terms.read().await;
        terms.get(&kind).and_then(|by_id| by_id.get(&id)).cloned()
    }

    /// Captures the full contents for persistence.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let terms = self.terms.read().await;
        let mut entries = Vec::new();
        for kind in Kind::ALL {
            if let Some(by_id) = terms.get(&kind) {
                for (id, record) in by_id {
                    entries.push(SnapshotTerm {
                        kind,
                        id: *id,
                        name: record.name.clone(),
                        meta: record.meta.clone(),
                    });
                }
            }
        }
        StoreSnapshot::new(self.next_id.load(Ordering::SeqCst), entries)
    }

    /// Rebuilds a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        snapshot.validate()?;
        let mut terms: HashMap<Kind, BTreeMap<EntityId, TermRecord>> = HashMap::new();
        let mut max_id = 0;
        for entry in snapshot.terms {
            max_id = max_id.max(entry.id.get());
            terms.entry(entry.kind).or_default().insert(
                entry.id,
                TermRecord {
                    name: entry.name,
                    meta: entry.meta,
                },
            );
        }

        let after_max = max_id.checked_add(1).ok_or_else(|| {
            StoreError::Corrupt(format!("term id {} leaves no room for new terms", max_id))
        })?;

        Ok(Self {
            terms: RwLock::new(terms),
            next_id: AtomicU64::new(snapshot.next_id.max(after_max)),
            offline: AtomicBool::new(false),
        })
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn create(&self, kind: Kind, name: &str) -> StoreResult<EntityId> {
        self.check_online()?;
        let id = EntityId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut terms = self.terms.write().await;
        terms.entry(kind).or_default().insert(
            id,
            TermRecord {
                name: name.to_string(),
                meta: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    async fn exists(&self, kind: Kind, id: EntityId) -> StoreResult<bool> {
        self.check_online()?;
        let terms = self.terms.read().await;
        Ok(terms.get(&kind).is_some_and(|by_id| by_id.contains_key(&id)))
    }

    async fn ids(&self, kind: Kind) -> StoreResult<Vec<EntityId>> {
        self.check_online()?;
        let terms = self.terms.read().await;
        Ok(terms
            .get(&kind)
            .map(|by_id| by_id.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn name(&self, kind: Kind, id: EntityId) -> StoreResult<Option<String>> {
        self.check_online()?;
        let terms = self.terms.read().await;
        Ok(terms
            .get(&kind)
            .and_then(|by_id| by_id.get(&id))
            .map(|record| record.name.clone()))
    }

    async fn get_meta(&self, kind: Kind, id: EntityId, key: &str) -> StoreResult<Option<String>> {
        self.check_online()?;
        let terms = self.terms.read().await;
        Ok(terms
            .get(&kind)
            .and_then(|by_id| by_id.get(&id))
            .and_then(|record| record.meta.get(key).cloned()))
    }

    async fn set_meta(
        &self,
        kind: Kind,
        id: EntityId,
        key: &str,
        value: &str,
    ) -> StoreResult<bool> {
        self.check_online()?;
        let mut terms = self.terms.write().await;
        match terms.get_mut(&kind).and_then(|by_id| by_id.get_mut(&id)) {
            Some(record) => {
                record.meta.insert(key.to_string(), value.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_meta(&self, kind: Kind, id: EntityId, key: &str) -> StoreResult<bool> {
        self.check_online()?;
        let mut terms = self.terms.write().await;
        match terms.get_mut(&kind).and_then(|by_id| by_id.get_mut(&id)) {
            Some(record) => {
                record.meta.remove(key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, kind: Kind, id: EntityId) -> StoreResult<bool> {
        self.check_online()?;
        let mut terms = self.terms.write().await;
        Ok(terms
            .get_mut(&kind)
            .and_then(|by_id| by_id.remove(&id))
            .is_some())
    }
}
