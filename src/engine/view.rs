use crate::core::{EntityId, Kind, Result, RowAction, Status, StatusFilter};
use crate::status::StatusRepository;
use serde::Serialize;
use std::sync::Arc;

/// Badge counts for the four list-view tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    pub all: usize,
    pub published: usize,
    pub draft: usize,
    pub trashed: usize,
}

impl ViewCounts {
    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Published => self.published,
            StatusFilter::Draft => self.draft,
            StatusFilter::Trashed => self.trashed,
        }
    }

    pub fn total(&self) -> usize {
        self.published + self.draft + self.trashed
    }

    fn record(&mut self, status: Status) {
        match status {
            Status::Published => self.published += 1,
            Status::Draft => self.draft += 1,
            Status::Trashed => self.trashed += 1,
        }
        if StatusFilter::All.matches(status) {
            self.all += 1;
        }
    }
}

/// One line of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermRow {
    pub id: EntityId,
    pub status: Status,
    pub is_default: bool,
    pub actions: Vec<RowAction>,
}

/// Row actions a list shows for a term. Default terms can be restored but
/// never drafted, trashed or purged.
pub fn row_actions(view: StatusFilter, status: Status, is_default: bool) -> Vec<RowAction> {
    if view == StatusFilter::Trashed || status == Status::Trashed {
        let mut actions = vec![RowAction::Restore];
        if !is_default {
            actions.push(RowAction::DeletePermanently);
        }
        return actions;
    }

    if is_default {
        Vec::new()
    } else {
        vec![RowAction::Draft, RowAction::Trash]
    }
}

/// Status-filtered listing for the admin views.
#[derive(Clone)]
pub struct ViewFilter {
    repo: Arc<dyn StatusRepository>,
}

impl ViewFilter {
    pub fn new(repo: Arc<dyn StatusRepository>) -> Self {
        Self { repo }
    }

    /// Status of a listed id, or `None` once the term has been deleted.
    /// Existence is checked after the status read.
    async fn live_status(&self, kind: Kind, id: EntityId) -> Result<Option<Status>> {
        let status = self.repo.load_status(kind, id).await?.unwrap_or_default();
        if !self.repo.exists(kind, id).await? {
            return Ok(None);
        }
        Ok(Some(status))
    }

    /// Ids matching `filter`, ascending. `All` leaves out trashed terms.
    pub async fn list(&self, kind: Kind, filter: StatusFilter) -> Result<Vec<EntityId>> {
        let mut matching = Vec::new();
        for id in self.repo.entity_ids(kind).await? {
            let Some(status) = self.live_status(kind, id).await? else {
                continue;
            };
            if filter.matches(status) {
                matching.push(id);
            }
        }
        Ok(matching)
    }

    pub async fn count(&self, kind: Kind, filter: StatusFilter) -> Result<usize> {
        Ok(self.list(kind, filter).await?.len())
    }

    /// All four badges from a single scan.
    pub async fn counts(&self, kind: Kind) -> Result<ViewCounts> {
        let mut counts = ViewCounts::default();
        for id in self.repo.entity_ids(kind).await? {
            if let Some(status) = self.live_status(kind, id).await? {
                counts.record(status);
            }
        }
        Ok(counts)
    }

    /// Rows for the `filter` tab, each with the actions it offers.
    pub async fn rows(&self, kind: Kind, filter: StatusFilter) -> Result<Vec<TermRow>> {
        let mut rows = Vec::new();
        for id in self.repo.entity_ids(kind).await? {
            let Some(status) = self.live_status(kind, id).await? else {
                continue;
            };
            if !filter.matches(status) {
                continue;
            }
            let is_default = self.repo.load_is_default(kind, id).await?.unwrap_or(false);
            rows.push(TermRow {
                id,
                status,
                is_default,
                actions: row_actions(filter, status, is_default),
            });
        }
        Ok(rows)
    }
}
