//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::model::SessionDraftError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudyLogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyLogError {
    /// The caller supplied an incomplete or malformed session; nothing changed.
    #[error(transparent)]
    Usage(#[from] SessionDraftError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    StudyLog(#[from] StudyLogError),
}
