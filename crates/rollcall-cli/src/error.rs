use std::io;

use rollcall_client::{BackendError, PushError};
use rollcall_core::SyncError;
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// The service refused or could not be reached.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Push channel could not be opened.
    #[error("push channel: {0}")]
    Push(#[from] PushError),

    /// HTTP client could not be built.
    #[error("backend setup failed: {0}")]
    Backend(#[from] BackendError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A command that signs in was given no credentials.
    #[error("pass --email and --password, or --guest")]
    MissingCredentials,
}
