//! Application error types.

use thiserror::Error;

/// Fatal errors: everything here aborts the run before or instead of
/// provisioning. Per-endpoint failures never become an `AppError`; they are
/// collected as skips in the run summary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Provider error: {0}")]
    Provider(#[from] provider_client::ProviderError),

    #[error("No endpoints were provisioned")]
    NothingProvisioned,
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
