//! Provider API errors.
//!
//! Auth and directory failures are fatal to a provisioning run; the
//! registration variants are recoverable per endpoint and carry the endpoint
//! identity so a skip can be reported with enough context to retry manually.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication rejected by provider")]
    AuthRejected,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Server directory unavailable: HTTP {status}")]
    DirectoryUnavailable { status: u16 },

    #[error("Malformed server directory: {0}")]
    MalformedDirectory(String),

    #[error("Registration rejected by {endpoint}: {reason}")]
    RegistrationRejected { endpoint: String, reason: String },

    #[error("Registration endpoint {endpoint} unreachable")]
    RegistrationUnreachable { endpoint: String },

    #[error("Malformed registration response from {endpoint}")]
    MalformedRegistration { endpoint: String },

    #[error("Trust anchor error: {0}")]
    TrustAnchor(String),
}

impl ProviderError {
    /// Recoverable errors skip one endpoint; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProviderError::RegistrationRejected { .. }
                | ProviderError::RegistrationUnreachable { .. }
                | ProviderError::MalformedRegistration { .. }
        )
    }
}
