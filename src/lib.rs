// ============================================================================
// Term Lifecycle Library
// ============================================================================

pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod status;
pub mod store;
pub mod web;

pub use config::{EngineConfig, KindConfig};
pub use core::{
    BulkAction, Command, DispatchError, EntityId, Kind, LifecycleError, Result, RowAction, Status,
    StatusFilter, StoreError,
};
pub use dispatch::{CommandDispatcher, MemoryAuthority, RequestAuthority, RequestContext};
pub use engine::{BulkOutcome, Outcome, TermEngine};
pub use status::{LegacyKeyFallback, MetaStatusRepository, StatusRepository};
pub use store::{EntityStore, MemoryEntityStore};
pub use web::{AppState, build_router};
