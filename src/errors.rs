//! Repository error taxonomy
//!
//! Every failure a command can report to the user falls into one of these
//! categories. Engine code returns `anyhow::Result` and raises these through
//! `anyhow`, so callers can recover the category with
//! `err.downcast_ref::<RepositoryError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Missing file, commit, blob or branch
    #[error("{0}")]
    NotFound(String),

    /// An abbreviated commit id matches zero or several commits
    #[error("{0}")]
    AmbiguousOrNotFound(String),

    /// Re-initializing a repository, re-creating a branch or re-writing a commit
    #[error("{0}")]
    DuplicateObject(String),

    /// The repository or the request is not in a state the command accepts
    #[error("{0}")]
    InvalidState(String),

    /// A checkout, reset or merge would clobber untracked working files
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedOverwrite { paths: Vec<PathBuf> },
}

impl RepositoryError {
    pub fn not_found(message: impl Into<String>) -> anyhow::Error {
        RepositoryError::NotFound(message.into()).into()
    }

    pub fn ambiguous_or_not_found(message: impl Into<String>) -> anyhow::Error {
        RepositoryError::AmbiguousOrNotFound(message.into()).into()
    }

    pub fn duplicate_object(message: impl Into<String>) -> anyhow::Error {
        RepositoryError::DuplicateObject(message.into()).into()
    }

    pub fn invalid_state(message: impl Into<String>) -> anyhow::Error {
        RepositoryError::InvalidState(message.into()).into()
    }
}

/// Recover the taxonomy category of an error raised by the engine, if any.
pub fn classify(error: &anyhow::Error) -> Option<&RepositoryError> {
    error.downcast_ref::<RepositoryError>()
}
