//! Domain error types for the organization admin core.
//!
//! These errors represent domain-level failures. Validation variants never
//! reach the remote service; the others wrap what came back from it.

use thiserror::Error;

use super::EntityKind;

/// Errors raised by group registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("Group name cannot be empty")]
    EmptyName,

    #[error("A group with this name already exists: {0}")]
    DuplicateName(String),

    #[error("Select at least one item first")]
    EmptySelection,

    #[error("Group not found: {0}")]
    NotFound(String),

    #[error("No organization selected")]
    NoOrganization,

    #[error("Groups for {org} were changed elsewhere; reload and try again")]
    Conflict { org: String },

    #[error("Failed to save groups: {0}")]
    Persist(String),
}

impl GroupError {
    /// Validation errors are purely local and block submission.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName | Self::DuplicateName(_) | Self::EmptySelection | Self::NotFound(_)
        )
    }
}

/// Errors raised by the bulk operation orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    #[error("No repositories selected")]
    NoTargets,

    #[error("Invalid repository name: {0}")]
    InvalidTarget(String),

    #[error("Enter at least one topic")]
    EmptyTopics,

    #[error("Select a property to update")]
    EmptyProperties,

    #[error("Team group has no members: {0}")]
    EmptyGroup(String),

    #[error("No organization selected")]
    NoOrganization,

    #[error("Another bulk operation is already running for {kind} in {org}")]
    Busy { org: String, kind: EntityKind },

    #[error("{failed_step} failed after {completed} of {total} calls: {message}")]
    Aborted {
        failed_step: String,
        completed: usize,
        total: usize,
        message: String,
    },
}

impl BulkError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoTargets
                | Self::InvalidTarget(_)
                | Self::EmptyTopics
                | Self::EmptyProperties
                | Self::EmptyGroup(_)
                | Self::NoOrganization
        )
    }
}

/// Errors raised by configuration stores.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Config revision conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },
}

/// Errors related to the remote GitHub service.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Not connected to GitHub")]
    NotConnected,

    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("Invalid repository reference: {0}")]
    InvalidFullName(String),

    #[error("GitHub operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Unified domain error type for callers that handle several of the above.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Group error: {0}")]
    Group(#[from] GroupError),

    #[error("Bulk error: {0}")]
    Bulk(#[from] BulkError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("Unknown domain error: {0}")]
    Unknown(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Unknown(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::Unknown(s.to_string())
    }
}
