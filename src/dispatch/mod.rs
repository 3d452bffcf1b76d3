//! Command surface shared by every transport.
//!
//! Each entry point checks the request authenticity token and the caller's
//! permission before the engine sees the command. Transports build a
//! [`RequestContext`] and typed arguments once and never touch the engine
//! directly.

pub mod auth;
pub mod notice;

pub use auth::{MemoryAuthority, Permission, RequestAuthority, User};

use crate::config::KindConfig;
use crate::core::{
    BulkAction, Command, DispatchError, DispatchResult, EntityId, Kind, RowAction, Status,
};
use crate::engine::{BulkOutcome, TermEngine};
use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, event};

pub const TOGGLE_STATUS_ACTION: &str = "toggle_status";
pub const ROW_ACTION: &str = "row_action";
pub const BULK_ACTION: &str = "bulk_action";

/// Caller identity and the authenticity token presented with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user: String,
    pub token: String,
}

impl RequestContext {
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleResponse {
    pub status: Status,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowActionResponse {
    /// New status; absent after a permanent deletion.
    pub status: Option<Status>,
    pub deleted: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkActionResponse {
    pub action: BulkAction,
    pub succeeded: usize,
    pub skipped: usize,
    pub message: String,
}

#[derive(Clone)]
pub struct CommandDispatcher {
    engine: TermEngine,
    authority: Arc<dyn RequestAuthority>,
}

impl CommandDispatcher {
    pub fn new(engine: TermEngine, authority: Arc<dyn RequestAuthority>) -> Self {
        Self { engine, authority }
    }

    pub fn engine(&self) -> &TermEngine {
        &self.engine
    }

    /// Token action name a client must request for `action` on `kind`.
    pub fn token_action(kind: Kind, action: &str) -> String {
        KindConfig::of(kind).nonce_action(action)
    }

    async fn authorize(&self, ctx: &RequestContext, kind: Kind, action: &str) -> DispatchResult<()> {
        let token_action = Self::token_action(kind, action);
        if !self.authority.verify_token(&token_action, &ctx.token).await {
            event!(Level::WARN, %kind, user = %ctx.user, action, "request token rejected");
            return Err(DispatchError::Unauthorized);
        }
        if !self.authority.can_manage(&ctx.user, kind).await {
            event!(Level::WARN, %kind, user = %ctx.user, action, "permission denied");
            return Err(DispatchError::Forbidden);
        }
        Ok(())
    }

    /// Reading a list view needs the same per-kind permission as changing it,
    /// but no request token.
    pub async fn authorize_view(&self, user: &str, kind: Kind) -> DispatchResult<()> {
        if !self.authority.can_manage(user, kind).await {
            event!(Level::WARN, %kind, user, "list view denied");
            return Err(DispatchError::Forbidden);
        }
        Ok(())
    }

    /// Inline published/draft switch for one term.
    pub async fn toggle_status(
        &self,
        ctx: &RequestContext,
        kind: Kind,
        id: EntityId,
        new_status: Status,
    ) -> DispatchResult<ToggleResponse> {
        self.authorize(ctx, kind, TOGGLE_STATUS_ACTION).await?;

        let label = KindConfig::of(kind).label;
        if id.get() == 0 {
            return Err(DispatchError::InvalidRequest(format!(
                "Invalid {} ID.",
                label.to_ascii_lowercase()
            )));
        }
        if new_status == Status::Trashed {
            return Err(DispatchError::InvalidRequest(
                "status must be published or draft".to_string(),
            ));
        }

        let outcome = self
            .engine
            .lifecycle
            .apply(kind, id, Command::SetStatus(new_status))
            .await?;
        let status = outcome.status().unwrap_or(new_status);

        Ok(ToggleResponse {
            status,
            message: format!("{} status updated successfully.", label),
        })
    }

    /// Draft, trash, restore or purge one term.
    pub async fn row_action(
        &self,
        ctx: &RequestContext,
        kind: Kind,
        id: EntityId,
        action: RowAction,
    ) -> DispatchResult<RowActionResponse> {
        self.authorize(ctx, kind, ROW_ACTION).await?;

        if id.get() == 0 {
            return Err(DispatchError::InvalidRequest("Invalid request.".to_string()));
        }

        let label = KindConfig::of(kind).label;
        let outcome = self
            .engine
            .lifecycle
            .apply(kind, id, action.command())
            .await?;

        let message = match action {
            RowAction::Draft => format!("{} moved to draft.", label),
            RowAction::Trash => format!("{} moved to trash.", label),
            RowAction::Restore => format!("{} restored.", label),
            RowAction::DeletePermanently => format!("{} permanently deleted.", label),
        };

        Ok(RowActionResponse {
            status: outcome.status(),
            deleted: outcome.is_deleted(),
            message,
        })
    }

    /// Applies `action` to every id, reporting aggregate counts.
    pub async fn bulk_action(
        &self,
        ctx: &RequestContext,
        kind: Kind,
        ids: &[EntityId],
        action: BulkAction,
    ) -> DispatchResult<BulkActionResponse> {
        self.authorize(ctx, kind, BULK_ACTION).await?;

        let BulkOutcome { succeeded, skipped } = if ids.is_empty() {
            BulkOutcome::default()
        } else {
            self.engine
                .bulk
                .apply_bulk(kind, ids, action)
                .await?
        };

        Ok(BulkActionResponse {
            action,
            succeeded,
            skipped,
            message: notice::bulk_message(kind, action, succeeded),
        })
    }
}
