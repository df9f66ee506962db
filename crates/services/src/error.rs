//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by quiz sessions and the quiz controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("an answer was already submitted for the current question")]
    NotAwaitingAnswer,
    #[error("no answer has been submitted for the current question")]
    NotShowingFeedback,
    #[error("select at least one option before submitting")]
    EmptySelection,
    #[error("no quiz is running")]
    NoActiveSession,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `BankCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid bank name: {0:?}")]
    InvalidName(String),
    #[error("could not find {0}")]
    UnknownBank(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
