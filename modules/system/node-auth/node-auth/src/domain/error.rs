//! Domain errors for node auth.

use node_auth_sdk::{NodeAuthError, ReviewError};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("missing client for webhook authentication")]
    MissingTokenReviewClient,

    #[error("missing client for webhook authorization")]
    MissingAccessReviewClient,

    #[error("missing certificate verifier for client CA bundle '{0}'")]
    MissingCertificateVerifier(String),

    #[error("no authorization mode specified")]
    NoAuthorizationMode,

    #[error("unknown authorization mode {0}")]
    UnknownAuthorizationMode(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("subject access review failed: {0}")]
    AccessReviewFailed(#[source] ReviewError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<DomainError> for NodeAuthError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::MissingTokenReviewClient
            | DomainError::MissingAccessReviewClient
            | DomainError::MissingCertificateVerifier(_)
            | DomainError::NoAuthorizationMode
            | DomainError::UnknownAuthorizationMode(_) => Self::Config(e.to_string()),
            DomainError::Unauthenticated(msg) => Self::Unauthenticated(msg),
            DomainError::InvalidInput(msg) => Self::InvalidInput(msg),
            DomainError::AccessReviewFailed(_) | DomainError::Internal(_) => {
                Self::Authorization(e.to_string())
            }
        }
    }
}
