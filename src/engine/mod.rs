//! Term lifecycle engine: state machine, default guard, bulk processing and
//! list views, all parametrized by [`Kind`].

pub mod bulk;
pub mod default_guard;
pub mod lifecycle;
pub mod view;

pub use bulk::{BulkActionProcessor, BulkOutcome};
pub use default_guard::DefaultGuard;
pub use lifecycle::{LifecycleEngine, Outcome, Transition, plan};
pub use view::{TermRow, ViewCounts, ViewFilter, row_actions};

use crate::config::EngineConfig;
use crate::core::Kind;
use crate::status::{LegacyKeyFallback, MetaStatusRepository, StatusRepository};
use crate::store::EntityStore;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// One async mutex per kind. Serializes default promotion against protected
/// transitions of the same kind; kinds never block each other.
#[derive(Debug, Default)]
pub struct KindLocks {
    locks: [Mutex<()>; 3],
}

impl KindLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, kind: Kind) -> MutexGuard<'_, ()> {
        self.locks[kind.index()].lock().await
    }
}

/// The assembled engine sharing one repository and one set of kind locks.
#[derive(Clone)]
pub struct TermEngine {
    pub lifecycle: LifecycleEngine,
    pub defaults: DefaultGuard,
    pub bulk: BulkActionProcessor,
    pub views: ViewFilter,
}

impl TermEngine {
    pub fn new(repo: Arc<dyn StatusRepository>) -> Self {
        let locks = Arc::new(KindLocks::new());
        let lifecycle = LifecycleEngine::new(repo.clone(), locks.clone());
        Self {
            defaults: DefaultGuard::new(repo.clone(), locks),
            bulk: BulkActionProcessor::new(lifecycle.clone()),
            views: ViewFilter::new(repo),
            lifecycle,
        }
    }

    /// Builds the repository stack for `store`: current keys, plus the legacy
    /// read fallback when the config enables it.
    pub fn with_store(store: Arc<dyn EntityStore>, config: &EngineConfig) -> Self {
        let meta = MetaStatusRepository::new(store.clone());
        let repo: Arc<dyn StatusRepository> = if config.legacy_fallback {
            Arc::new(LegacyKeyFallback::new(meta, store))
        } else {
            Arc::new(meta)
        };
        Self::new(repo)
    }

    pub fn repository(&self) -> &Arc<dyn StatusRepository> {
        self.lifecycle.repository()
    }
}
