use super::types::{Command, EntityId, Kind, Status};
use thiserror::Error;

/// Failure of the underlying metadata store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt store data: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Rejection of a lifecycle transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{kind} {id} not found")]
    NotFound { kind: Kind, id: EntityId },

    #[error("Cannot change status of default {kind}.")]
    DefaultProtected { kind: Kind, id: EntityId },

    #[error("Command '{command}' is not valid for a {status} {kind}")]
    InvalidCommand {
        kind: Kind,
        command: String,
        status: Status,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl LifecycleError {
    pub fn not_found(kind: Kind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn invalid(kind: Kind, command: Command, status: Status) -> Self {
        Self::InvalidCommand {
            kind,
            command: command.to_string(),
            status,
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Failure at the command surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Security check failed.")]
    Unauthorized,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        Self::Lifecycle(LifecycleError::Storage(err))
    }
}

impl DispatchError {
    /// Stable machine-readable code shared by both transports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Lifecycle(LifecycleError::NotFound { .. }) => "not_found",
            Self::Lifecycle(LifecycleError::DefaultProtected { .. }) => "default_protected",
            Self::Lifecycle(LifecycleError::InvalidCommand { .. }) => "invalid_command",
            Self::Lifecycle(LifecycleError::Storage(_)) => "storage_error",
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
