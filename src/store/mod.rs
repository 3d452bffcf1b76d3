//! Metadata store the lifecycle engine persists through.
//!
//! The host platform owns the real key-value storage; the engine only needs
//! get/set/delete of string values by `(kind, id, key)` plus enumeration of the
//! ids of a kind. [`MemoryEntityStore`] is the in-process implementation used by
//! the bundled server and the tests.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryEntityStore;
pub use snapshot::StoreSnapshot;

use crate::core::{EntityId, Kind, StoreResult};
use async_trait::async_trait;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Creates a term and returns its id. Metadata starts empty.
    async fn create(&self, kind: Kind, name: &str) -> StoreResult<EntityId>;

    async fn exists(&self, kind: Kind, id: EntityId) -> StoreResult<bool>;

    /// Ids of every term of `kind`, ascending.
    async fn ids(&self, kind: Kind) -> StoreResult<Vec<EntityId>>;

    async fn name(&self, kind: Kind, id: EntityId) -> StoreResult<Option<String>>;

    /// `Ok(None)` both for an unset key and for an unknown id.
    async fn get_meta(&self, kind: Kind, id: EntityId, key: &str) -> StoreResult<Option<String>>;

    /// Returns `false` when the term does not exist; nothing is written then.
    async fn set_meta(&self, kind: Kind, id: EntityId, key: &str, value: &str)
    -> StoreResult<bool>;

    /// Returns `false` when the term does not exist.
    async fn delete_meta(&self, kind: Kind, id: EntityId, key: &str) -> StoreResult<bool>;

    /// Removes the term and all of its metadata. Returns `false` if it was absent.
    async fn delete(&self, kind: Kind, id: EntityId) -> StoreResult<bool>;
}
