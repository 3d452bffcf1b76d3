use super::LifecycleEngine;
use crate::core::{BulkAction, EntityId, Kind, LifecycleError, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{Level, event};

/// Aggregate result of a bulk run. Which ids were skipped is not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub skipped: usize,
}

impl BulkOutcome {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped
    }
}

/// Applies one action to many terms, skipping what it cannot change.
#[derive(Clone)]
pub struct BulkActionProcessor {
    engine: LifecycleEngine,
}

impl BulkActionProcessor {
    pub fn new(engine: LifecycleEngine) -> Self {
        Self { engine }
    }

    /// Runs `action` on every distinct id.
    ///
    /// Default-protected, missing and state-invalid terms are counted as
    /// skipped and the run continues. A storage failure stops the run and is
    /// returned as is; terms processed before it keep their new status.
    pub async fn apply_bulk(
        &self,
        kind: Kind,
        ids: &[EntityId],
        action: BulkAction,
    ) -> Result<BulkOutcome, StoreError> {
        let command = action.command();
        let distinct: BTreeSet<EntityId> = ids.iter().copied().collect();
        let mut outcome = BulkOutcome::default();

        for id in distinct {
            match self.engine.apply(kind, id, command).await {
                Ok(_) => outcome.succeeded += 1,
                Err(LifecycleError::Storage(err)) => {
                    event!(
                        Level::ERROR,
                        %kind,
                        action = action.as_str(),
                        error = %err,
                        succeeded = outcome.succeeded,
                        "bulk action aborted by store failure"
                    );
                    return Err(err);
                }
                Err(err) => {
                    event!(Level::DEBUG, %kind, %id, reason = %err, "bulk action skipped term");
                    outcome.skipped += 1;
                }
            }
        }

        event!(
            Level::INFO,
            %kind,
            action = action.as_str(),
            succeeded = outcome.succeeded,
            skipped = outcome.skipped,
            "bulk action finished"
        );
        Ok(outcome)
    }
}
