//! Migration shim for installs that stored lifecycle metadata under the
//! unprefixed `aps_<kind>_*` keys.
//!
//! Reads try the current key first and fall back to the legacy key only when
//! the current one is unset or empty. Writes go to the current key through the inner
//! repository and then drop the legacy key, so a migrated term never reads a
//! stale legacy value again.

use super::{StatusRepository, parse_flag, parse_status};
use crate::config::KindConfig;
use crate::core::{EntityId, Kind, Result, Status, StoreResult};
use crate::store::EntityStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{Level, event};

pub struct LegacyKeyFallback<R> {
    inner: R,
    store: Arc<dyn EntityStore>,
}

impl<R: StatusRepository> LegacyKeyFallback<R> {
    pub fn new(inner: R, store: Arc<dyn EntityStore>) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    async fn read_legacy(&self, kind: Kind, id: EntityId, current_key: &str) -> StoreResult<Option<String>> {
        let Some(legacy_key) = KindConfig::of(kind).legacy_key(current_key) else {
            return Ok(None);
        };
        let value = self.store.get_meta(kind, id, &legacy_key).await?;
        if value.is_some() {
            event!(Level::DEBUG, %kind, %id, key = %legacy_key, "read legacy term meta key");
        }
        Ok(value)
    }

    /// A current key holding anything but the empty string shadows the legacy
    /// key, even when its value does not parse.
    async fn current_is_set(&self, kind: Kind, id: EntityId, current_key: &str) -> StoreResult<bool> {
        let value = self.store.get_meta(kind, id, current_key).await?;
        Ok(value.is_some_and(|v| !v.is_empty()))
    }

    async fn drop_legacy(&self, kind: Kind, id: EntityId, current_key: &str) -> StoreResult<()> {
        if let Some(legacy_key) = KindConfig::of(kind).legacy_key(current_key) {
            self.store.delete_meta(kind, id, &legacy_key).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: StatusRepository> StatusRepository for LegacyKeyFallback<R> {
    async fn exists(&self, kind: Kind, id: EntityId) -> StoreResult<bool> {
        self.inner.exists(kind, id).await
    }

    async fn entity_ids(&self, kind: Kind) -> StoreResult<Vec<EntityId>> {
        self.inner.entity_ids(kind).await
    }

    async fn load_status(&self, kind: Kind, id: EntityId) -> StoreResult<Option<Status>> {
        let key = KindConfig::of(kind).status_key();
        if self.current_is_set(kind, id, &key).await? {
            return self.inner.load_status(kind, id).await;
        }
        Ok(parse_status(self.read_legacy(kind, id, &key).await?))
    }

    async fn load_is_default(&self, kind: Kind, id: EntityId) -> StoreResult<Option<bool>> {
        let key = KindConfig::of(kind).is_default_key();
        if self.current_is_set(kind, id, &key).await? {
            return self.inner.load_is_default(kind, id).await;
        }
        Ok(parse_flag(self.read_legacy(kind, id, &key).await?))
    }

    async fn store_status(&self, kind: Kind, id: EntityId, status: Status) -> Result<()> {
        self.inner.store_status(kind, id, status).await?;
        self.drop_legacy(kind, id, &KindConfig::of(kind).status_key())
            .await?;
        Ok(())
    }

    async fn store_is_default(&self, kind: Kind, id: EntityId, is_default: bool) -> Result<()> {
        self.inner.store_is_default(kind, id, is_default).await?;
        self.drop_legacy(kind, id, &KindConfig::of(kind).is_default_key())
            .await?;
        Ok(())
    }

    async fn updated_at(&self, kind: Kind, id: EntityId) -> StoreResult<Option<DateTime<Utc>>> {
        self.inner.updated_at(kind, id).await
    }

    async fn remove(&self, kind: Kind, id: EntityId) -> Result<()> {
        self.inner.remove(kind, id).await
    }
}
