use super::KindLocks;
use crate::core::{EntityId, Kind, LifecycleError, Result, Status};
use crate::status::StatusRepository;
use std::sync::Arc;
use tracing::{Level, event};

/// Keeps at most one default term per kind.
#[derive(Clone)]
pub struct DefaultGuard {
    repo: Arc<dyn StatusRepository>,
    locks: Arc<KindLocks>,
}

impl DefaultGuard {
    pub fn new(repo: Arc<dyn StatusRepository>, locks: Arc<KindLocks>) -> Self {
        Self { repo, locks }
    }

    /// Makes `id` the only default of its kind.
    ///
    /// Every other flagged term is cleared before `id` is set, so an
    /// interrupted promotion leaves zero defaults, never two. Promotions of
    /// the same kind are serialized; the last one to run wins.
    pub async fn promote_to_default(&self, kind: Kind, id: EntityId) -> Result<()> {
        let _guard = self.locks.lock(kind).await;

        let status = self.repo.get_status(kind, id).await?;
        if status == Status::Trashed {
            return Err(LifecycleError::InvalidCommand {
                kind,
                command: "promote_to_default".to_string(),
                status,
            });
        }

        let mut cleared = 0usize;
        for other in self.repo.entity_ids(kind).await? {
            if other == id {
                continue;
            }
            if self.repo.load_is_default(kind, other).await? != Some(true) {
                continue;
            }
            match self.repo.store_is_default(kind, other, false).await {
                Ok(()) => cleared += 1,
                // Deleted by someone else since the scan.
                Err(LifecycleError::NotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        self.repo.set_is_default(kind, id, true).await?;
        event!(Level::INFO, %kind, %id, cleared, "promoted default term");
        Ok(())
    }

    /// Clears the flag on `id` only. The kind may be left without a default.
    pub async fn demote(&self, kind: Kind, id: EntityId) -> Result<()> {
        let _guard = self.locks.lock(kind).await;
        if self.repo.set_is_default(kind, id, false).await? {
            event!(Level::INFO, %kind, %id, "demoted default term");
        }
        Ok(())
    }

    /// Whether `id` is currently the default and therefore protected.
    pub async fn is_protected(&self, kind: Kind, id: EntityId) -> Result<bool> {
        self.repo.get_is_default(kind, id).await
    }

    /// The term that records lacking a classification get assigned to.
    pub async fn current_default(&self, kind: Kind) -> Result<Option<EntityId>> {
        for id in self.repo.entity_ids(kind).await? {
            if self.repo.load_is_default(kind, id).await? == Some(true) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Number of flagged terms; more than one means the store was edited
    /// behind the engine's back.
    pub async fn default_count(&self, kind: Kind) -> Result<usize> {
        let mut count = 0;
        for id in self.repo.entity_ids(kind).await? {
            if self.repo.load_is_default(kind, id).await? == Some(true) {
                count += 1;
            }
        }
        Ok(count)
    }
}
