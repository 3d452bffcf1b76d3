pub mod error;
pub mod types;

pub use error::{
    DispatchError, DispatchResult, LifecycleError, Result, StoreError, StoreResult,
};
pub use types::{BulkAction, Command, EntityId, Kind, RowAction, Status, StatusFilter};
