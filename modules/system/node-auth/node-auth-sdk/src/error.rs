//! Error types for the node auth module.

use thiserror::Error;

/// Errors returned by the node auth pipeline.
///
/// Denial is not an error: it is expressed via `Decision.allowed == false`.
#[derive(Debug, Error)]
pub enum NodeAuthError {
    /// Invalid setup detected while constructing the pipeline. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// The request carried no usable credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The authorization decision could not be obtained.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// The request could not be turned into authorization attributes.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors reported by the remote authority and certificate verification collaborators.
#[derive(Debug, Clone, Error)]
pub enum ReviewError {
    /// The remote authority could not be reached.
    #[error("review service unavailable: {0}")]
    Unavailable(String),

    /// The transport gave up waiting for an answer.
    #[error("review timed out: {0}")]
    Timeout(String),

    /// The caller cancelled the in-flight review.
    #[error("review cancelled")]
    Cancelled,

    /// The collaborator rejected the input outright (e.g. a malformed certificate).
    #[error("review rejected: {0}")]
    Rejected(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
