use super::KindLocks;
use crate::core::{Command, EntityId, Kind, LifecycleError, Result, Status};
use crate::status::StatusRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// What a valid command does to a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Re-applies the current status; nothing is written.
    Stay(Status),
    Move(Status),
    /// Terminal: the term is removed from the store.
    Delete,
}

/// Result of a successful [`LifecycleEngine::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Unchanged { status: Status },
    Changed { from: Status, to: Status },
    Deleted,
}

impl Outcome {
    /// Status after the command; `None` once the term is gone.
    pub fn status(&self) -> Option<Status> {
        match self {
            Outcome::Unchanged { status } => Some(*status),
            Outcome::Changed { to, .. } => Some(*to),
            Outcome::Deleted => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Outcome::Deleted)
    }
}

/// Transition table. The default-flag guard runs before the state match, so
/// a default term is refused every protected command even when the command
/// would otherwise be a no-op.
pub fn plan(
    kind: Kind,
    id: EntityId,
    current: Status,
    is_default: bool,
    command: Command,
) -> Result<Transition> {
    if is_default && command.is_protected() {
        return Err(LifecycleError::DefaultProtected { kind, id });
    }

    use Status::{Draft, Published, Trashed};
    let transition = match (current, command) {
        (Published, Command::MoveToDraft) => Transition::Move(Draft),
        (Draft, Command::MoveToDraft) => Transition::Stay(Draft),
        (Published | Draft, Command::MoveToTrash) => Transition::Move(Trashed),
        (Trashed, Command::MoveToTrash) => Transition::Stay(Trashed),
        (Trashed, Command::Restore) => Transition::Move(Published),
        (Trashed, Command::DeletePermanently) => Transition::Delete,
        (Published | Draft, Command::SetStatus(target @ (Published | Draft))) => {
            if target == current {
                Transition::Stay(current)
            } else {
                Transition::Move(target)
            }
        }
        (status, command) => return Err(LifecycleError::invalid(kind, command, status)),
    };
    Ok(transition)
}

/// Single-term state machine over a [`StatusRepository`].
#[derive(Clone)]
pub struct LifecycleEngine {
    repo: Arc<dyn StatusRepository>,
    locks: Arc<KindLocks>,
}

impl LifecycleEngine {
    pub fn new(repo: Arc<dyn StatusRepository>, locks: Arc<KindLocks>) -> Self {
        Self { repo, locks }
    }

    pub fn repository(&self) -> &Arc<dyn StatusRepository> {
        &self.repo
    }

    /// Validates `command` against the term's current state and persists the
    /// result. Protected commands run under the kind lock shared with
    /// [`DefaultGuard`](super::DefaultGuard), so a concurrent promotion cannot
    /// slip between the flag check and the write.
    pub async fn apply(&self, kind: Kind, id: EntityId, command: Command) -> Result<Outcome> {
        let span = info_span!("term_lifecycle_apply", %kind, %id, %command);
        self.apply_locked(kind, id, command).instrument(span).await
    }

    async fn apply_locked(&self, kind: Kind, id: EntityId, command: Command) -> Result<Outcome> {
        let _guard = if command.is_protected() {
            Some(self.locks.lock(kind).await)
        } else {
            None
        };

        let current = self.repo.get_status(kind, id).await?;
        let is_default = self.repo.load_is_default(kind, id).await?.unwrap_or(false);

        let transition = match plan(kind, id, current, is_default, command) {
            Ok(transition) => transition,
            Err(err) => {
                event!(Level::INFO, error = %err, "term transition rejected");
                return Err(err);
            }
        };

        let outcome = match transition {
            Transition::Stay(status) => Outcome::Unchanged { status },
            Transition::Move(to) => {
                self.repo.store_status(kind, id, to).await?;
                Outcome::Changed { from: current, to }
            }
            Transition::Delete => {
                self.repo.remove(kind, id).await?;
                Outcome::Deleted
            }
        };

        event!(Level::DEBUG, ?outcome, "term transition applied");
        Ok(outcome)
    }

    pub async fn status(&self, kind: Kind, id: EntityId) -> Result<Status> {
        self.repo.get_status(kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: Kind = Kind::Category;
    const ID: EntityId = EntityId(1);

    fn run(current: Status, is_default: bool, command: Command) -> Result<Transition> {
        plan(K, ID, current, is_default, command)
    }

    #[test]
    fn table_rows_for_plain_terms() {
        assert_eq!(run(Status::Published, false, Command::MoveToDraft), Ok(Transition::Move(Status::Draft)));
        assert_eq!(run(Status::Draft, false, Command::MoveToDraft), Ok(Transition::Stay(Status::Draft)));
        assert_eq!(run(Status::Published, false, Command::MoveToTrash), Ok(Transition::Move(Status::Trashed)));
        assert_eq!(run(Status::Draft, false, Command::MoveToTrash), Ok(Transition::Move(Status::Trashed)));
        assert_eq!(run(Status::Trashed, false, Command::Restore), Ok(Transition::Move(Status::Published)));
        assert_eq!(run(Status::Trashed, false, Command::DeletePermanently), Ok(Transition::Delete));
    }

    #[test]
    fn inline_toggle_switches_between_published_and_draft() {
        assert_eq!(
            run(Status::Published, false, Command::SetStatus(Status::Draft)),
            Ok(Transition::Move(Status::Draft))
        );
        assert_eq!(
            run(Status::Draft, false, Command::SetStatus(Status::Published)),
            Ok(Transition::Move(Status::Published))
        );
        assert_eq!(
            run(Status::Published, false, Command::SetStatus(Status::Published)),
            Ok(Transition::Stay(Status::Published))
        );
    }

    #[test]
    fn undefined_rows_are_invalid() {
        for (status, command) in [
            (Status::Published, Command::Restore),
            (Status::Draft, Command::Restore),
            (Status::Published, Command::DeletePermanently),
            (Status::Trashed, Command::MoveToDraft),
            (Status::Trashed, Command::SetStatus(Status::Published)),
            (Status::Published, Command::SetStatus(Status::Trashed)),
        ] {
            assert!(
                matches!(run(status, false, command), Err(LifecycleError::InvalidCommand { .. })),
                "{command} on {status} should be invalid"
            );
        }
    }

    #[test]
    fn default_terms_refuse_every_protected_command() {
        for status in Status::ALL {
            for command in [
                Command::MoveToDraft,
                Command::MoveToTrash,
                Command::DeletePermanently,
                Command::SetStatus(Status::Draft),
            ] {
                assert_eq!(
                    run(status, true, command),
                    Err(LifecycleError::DefaultProtected { kind: K, id: ID })
                );
            }
        }
    }

    #[test]
    fn restore_ignores_the_default_flag() {
        assert_eq!(run(Status::Trashed, true, Command::Restore), Ok(Transition::Move(Status::Published)));
    }

    #[test]
    fn outcome_reports_resulting_status() {
        assert_eq!(Outcome::Deleted.status(), None);
        assert_eq!(
            Outcome::Changed { from: Status::Draft, to: Status::Published }.status(),
            Some(Status::Published)
        );
    }
}
