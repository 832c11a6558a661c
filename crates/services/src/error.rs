//! Shared error types for the services crate.

use thiserror::Error;

use buddy_core::model::{HintError, ParseProblemIdError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Shown to the panel when no credential is stored. The panel matches on
/// this text to show the setup prompt instead of an inline error.
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "API Key not set. Please set it in the extension popup.";

/// Errors emitted by a `GenerationGateway`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("{MISSING_CREDENTIAL_MESSAGE}")]
    MissingCredential,
    #[error("{0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Errors emitted by `BackgroundDispatcher` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("Problem not found")]
    NotFound,
    #[error(transparent)]
    Hint(#[from] HintError),
    #[error(transparent)]
    ProblemId(#[from] ParseProblemIdError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error("Please enter a valid API Key.")]
    EmptyApiKey,
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
    Storage(#[from] StorageError),
}
