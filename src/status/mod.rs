//! Status and default-flag persistence on top of an [`EntityStore`].

pub mod legacy;

pub use legacy::LegacyKeyFallback;

use crate::config::KindConfig;
use crate::core::{EntityId, Kind, LifecycleError, Result, Status, StoreResult};
use crate::store::EntityStore;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

pub(crate) const FLAG_SET: &str = "1";
pub(crate) const FLAG_CLEAR: &str = "0";

pub(crate) fn parse_status(raw: Option<String>) -> Option<Status> {
    raw.as_deref().and_then(Status::parse)
}

pub(crate) fn parse_flag(raw: Option<String>) -> Option<bool> {
    match raw.as_deref() {
        None | Some("") => None,
        Some(value) => Some(value == FLAG_SET),
    }
}

/// Reads and writes the lifecycle attributes of a term.
///
/// `load_*` return what is persisted (`None` when unset); the provided
/// `get_*`/`set_*` methods apply the published / not-default fallbacks and the
/// existence check. Writes never enforce the one-default rule, that belongs
/// to [`DefaultGuard`](crate::engine::DefaultGuard).
#[async_trait]
pub trait StatusRepository: Send + Sync {
    async fn exists(&self, kind: Kind, id: EntityId) -> StoreResult<bool>;

    async fn entity_ids(&self, kind: Kind) -> StoreResult<Vec<EntityId>>;

    async fn load_status(&self, kind: Kind, id: EntityId) -> StoreResult<Option<Status>>;

    async fn load_is_default(&self, kind: Kind, id: EntityId) -> StoreResult<Option<bool>>;

    /// Persists the status and refreshes `updated_at`.
    async fn store_status(&self, kind: Kind, id: EntityId, status: Status) -> Result<()>;

    /// Persists the flag and refreshes `updated_at`.
    async fn store_is_default(&self, kind: Kind, id: EntityId, is_default: bool) -> Result<()>;

    async fn updated_at(&self, kind: Kind, id: EntityId) -> StoreResult<Option<DateTime<Utc>>>;

    /// Deletes the term. Terminal.
    async fn remove(&self, kind: Kind, id: EntityId) -> Result<()>;

    async fn get_status(&self, kind: Kind, id: EntityId) -> Result<Status> {
        if !self.exists(kind, id).await? {
            return Err(LifecycleError::not_found(kind, id));
        }
        Ok(self.load_status(kind, id).await?.unwrap_or_default())
    }

    /// Returns whether anything was written.
    async fn set_status(&self, kind: Kind, id: EntityId, status: Status) -> Result<bool> {
        if !self.exists(kind, id).await? {
            return Err(LifecycleError::not_found(kind, id));
        }
        if self.load_status(kind, id).await?.unwrap_or_default() == status {
            return Ok(false);
        }
        self.store_status(kind, id, status).await?;
        Ok(true)
    }

    async fn get_is_default(&self, kind: Kind, id: EntityId) -> Result<bool> {
        if !self.exists(kind, id).await? {
            return Err(LifecycleError::not_found(kind, id));
        }
        Ok(self.load_is_default(kind, id).await?.unwrap_or(false))
    }

    /// Returns whether anything was written.
    async fn set_is_default(&self, kind: Kind, id: EntityId, is_default: bool) -> Result<bool> {
        if !self.exists(kind, id).await? {
            return Err(LifecycleError::not_found(kind, id));
        }
        if self.load_is_default(kind, id).await?.unwrap_or(false) == is_default {
            return Ok(false);
        }
        self.store_is_default(kind, id, is_default).await?;
        Ok(true)
    }
}

/// Repository reading and writing the current (`_aps_<kind>_*`) keys only.
#[derive(Clone)]
pub struct MetaStatusRepository {
    store: Arc<dyn EntityStore>,
}

impl MetaStatusRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    async fn touch(&self, kind: Kind, id: EntityId) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.write(kind, id, &KindConfig::of(kind).updated_at_key(), &now)
            .await
    }

    async fn write(&self, kind: Kind, id: EntityId, key: &str, value: &str) -> Result<()> {
        if !self.store.set_meta(kind, id, key, value).await? {
            return Err(LifecycleError::not_found(kind, id));
        }
        Ok(())
    }
}

#[async_trait]
impl StatusRepository for MetaStatusRepository {
    async fn exists(&self, kind: Kind, id: EntityId) -> StoreResult<bool> {
        self.store.exists(kind, id).await
    }

    async fn entity_ids(&self, kind: Kind) -> StoreResult<Vec<EntityId>> {
        self.store.ids(kind).await
    }

    async fn load_status(&self, kind: Kind, id: EntityId) -> StoreResult<Option<Status>> {
        let key = KindConfig::of(kind).status_key();
        Ok(parse_status(self.store.get_meta(kind, id, &key).await?))
    }

    async fn load_is_default(&self, kind: Kind, id: EntityId) -> StoreResult<Option<bool>> {
        let key = KindConfig::of(kind).is_default_key();
        Ok(parse_flag(self.store.get_meta(kind, id, &key).await?))
    }

    async fn store_status(&self, kind: Kind, id: EntityId, status: Status) -> Result<()> {
        let key = KindConfig::of(kind).status_key();
        self.write(kind, id, &key, status.as_str()).await?;
        self.touch(kind, id).await
    }

    async fn store_is_default(&self, kind: Kind, id: EntityId, is_default: bool) -> Result<()> {
        let key = KindConfig::of(kind).is_default_key();
        let value = if is_default { FLAG_SET } else { FLAG_CLEAR };
        self.write(kind, id, &key, value).await?;
        self.touch(kind, id).await
    }

    async fn updated_at(&self, kind: Kind, id: EntityId) -> StoreResult<Option<DateTime<Utc>>> {
        let key = KindConfig::of(kind).updated_at_key();
        Ok(self
            .store
            .get_meta(kind, id, &key)
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)))
    }

    async fn remove(&self, kind: Kind, id: EntityId) -> Result<()> {
        if !self.store.delete(kind, id).await? {
            return Err(LifecycleError::not_found(kind, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEntityStore;

    fn repo() -> (Arc<MemoryEntityStore>, MetaStatusRepository) {
        let store = Arc::new(MemoryEntityStore::new());
        let repo = MetaStatusRepository::new(store.clone());
        (store, repo)
    }

    #[test]
    fn flag_parsing_treats_empty_as_unset() {
        assert_eq!(parse_flag(None), None);
        assert_eq!(parse_flag(Some(String::new())), None);
        assert_eq!(parse_flag(Some("1".into())), Some(true));
        assert_eq!(parse_flag(Some("0".into())), Some(false));
        assert_eq!(parse_flag(Some("yes".into())), Some(false));
    }

    #[tokio::test]
    async fn unset_status_reads_as_published() {
        let (store, repo) = repo();
        let id = store.create(Kind::Category, "Books").await.unwrap();
        assert_eq!(repo.get_status(Kind::Category, id).await.unwrap(), Status::Published);
        assert!(!repo.get_is_default(Kind::Category, id).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_status_reads_as_published() {
        let (store, repo) = repo();
        let id = store.create(Kind::Tag, "Sale").await.unwrap();
        store
            .set_meta(Kind::Tag, id, "_aps_tag_status", "pending")
            .await
            .unwrap();
        assert_eq!(repo.get_status(Kind::Tag, id).await.unwrap(), Status::Published);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_store, repo) = repo();
        let err = repo.get_status(Kind::Tag, EntityId(7)).await.unwrap_err();
        assert_eq!(err, LifecycleError::not_found(Kind::Tag, EntityId(7)));
    }

    #[tokio::test]
    async fn repeated_set_status_writes_once() {
        let (store, repo) = repo();
        let id = store.create(Kind::Ribbon, "New").await.unwrap();
        assert!(repo.set_status(Kind::Ribbon, id, Status::Draft).await.unwrap());
        let stamped = repo.updated_at(Kind::Ribbon, id).await.unwrap();
        assert!(stamped.is_some());

        assert!(!repo.set_status(Kind::Ribbon, id, Status::Draft).await.unwrap());
        assert_eq!(repo.updated_at(Kind::Ribbon, id).await.unwrap(), stamped);

        let fresh = store.create(Kind::Ribbon, "Fresh").await.unwrap();
        assert!(!repo.set_status(Kind::Ribbon, fresh, Status::Published).await.unwrap());
        assert_eq!(repo.updated_at(Kind::Ribbon, fresh).await.unwrap(), None);
    }

    #[tokio::test]
    async fn flags_are_stored_as_one_and_zero() {
        let (store, repo) = repo();
        let id = store.create(Kind::Category, "Home").await.unwrap();
        repo.set_is_default(Kind::Category, id, true).await.unwrap();
        assert_eq!(
            store
                .get_meta(Kind::Category, id, "_aps_category_is_default")
                .await
                .unwrap()
                .as_deref(),
            Some("1")
        );
        repo.set_is_default(Kind::Category, id, false).await.unwrap();
        assert_eq!(
            store
                .get_meta(Kind::Category, id, "_aps_category_is_default")
                .await
                .unwrap()
                .as_deref(),
            Some("0")
        );
    }
}
