// Domain Error Types
//
// Every variant is per-request and recoverable: the dispatcher renders it as
// plain reply text and the registry is left untouched.

use super::entry::EntryId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or unparseable arguments; carries the usage hint to show
    #[error("{0}")]
    MalformedCommand(String),

    #[error("Queue {0} not found.")]
    NotFound(EntryId),

    /// Invoking user is not tagged on the entry
    #[error("Your tag was not found in queue {0}.")]
    Forbidden(EntryId),
}

impl DomainError {
    pub fn malformed(usage: impl Into<String>) -> Self {
        DomainError::MalformedCommand(usage.into())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
