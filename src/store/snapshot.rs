//! JSON snapshot persistence for [`MemoryEntityStore`](super::MemoryEntityStore).

use super::MemoryEntityStore;
use crate::core::{EntityId, Kind, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tokio::fs;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTerm {
    pub kind: Kind,
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub next_id: u64,
    pub terms: Vec<SnapshotTerm>,
}

impl StoreSnapshot {
    pub fn new(next_id: u64, terms: Vec<SnapshotTerm>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            next_id,
            terms,
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }

        let mut seen = HashSet::new();
        for term in &self.terms {
            if !seen.insert(term.id) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate term id {} in snapshot",
                    term.id
                )));
            }
        }
        Ok(())
    }
}

impl MemoryEntityStore {
    /// Writes the store to `path` atomically (temp file, then rename).
    pub async fn save_snapshot(&self, path: &Path) -> StoreResult<()> {
        let snapshot = self.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StoreError::Corrupt(format!("Failed to encode snapshot: {}", e)))?;
        atomic_write(path, &bytes).await
    }

    /// Loads a store from `path`. A missing file yields an empty store.
    pub async fn load_snapshot(path: &Path) -> StoreResult<Self> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "snapshot '{}' not found, starting with an empty store",
                    path.display()
                );
                return Ok(Self::new());
            }
            Err(err) => {
                return Err(StoreError::Io(format!(
                    "Failed to read snapshot '{}': {}",
                    path.display(),
                    err
                )));
            }
        };

        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Corrupt(format!("Failed to decode snapshot '{}': {}", path.display(), e))
        })?;
        Self::from_snapshot(snapshot)
    }
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|err| {
                StoreError::Io(format!(
                    "Failed to create parent directory '{}': {}",
                    parent.display(),
                    err
                ))
            })?;
        }
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await.map_err(|err| {
        StoreError::Io(format!(
            "Failed to write temp file '{}': {}",
            tmp.display(),
            err
        ))
    })?;

    fs::rename(&tmp, path).await.map_err(|err| {
        StoreError::Io(format!(
            "Failed to rename temp file '{}' -> '{}': {}",
            tmp.display(),
            path.display(),
            err
        ))
    })?;

    Ok(())
}
