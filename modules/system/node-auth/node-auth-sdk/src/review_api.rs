//! Collaborator traits.
//!
//! The remote authority (token review, subject access review) and the TLS
//! certificate verification machinery are consumed only through these traits.
//! Transport timeouts and retries belong to the implementations.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ReviewError;
use crate::models::{
    CertificateSubject, ClientCertificate, SubjectAccessReview, SubjectAccessReviewStatus,
    TokenReview,
};

/// Remote token review.
#[async_trait]
pub trait TokenReviewClient: Send + Sync {
    /// Ask the remote authority whether `bearer_token` is valid and who it belongs to.
    ///
    /// # Errors
    ///
    /// Any transport or remote failure. A token that is simply not valid is
    /// reported as `Ok` with `authenticated == false`.
    async fn review_token(&self, bearer_token: &str) -> Result<TokenReview, ReviewError>;
}

/// Remote subject access review.
#[async_trait]
pub trait SubjectAccessReviewClient: Send + Sync {
    /// Ask the remote authority whether the described access is allowed.
    ///
    /// # Errors
    ///
    /// Any transport or remote failure. A denial is reported as `Ok`.
    async fn review_access(
        &self,
        review: &SubjectAccessReview,
    ) -> Result<SubjectAccessReviewStatus, ReviewError>;
}

/// Client certificate chain verification.
pub trait ClientCertificateVerifier: Send + Sync {
    /// Verify `certificate` against the CA bundle at `ca_bundle` and return its subject.
    ///
    /// # Errors
    ///
    /// `Rejected` when the chain does not verify; other variants for I/O failures.
    fn verify(
        &self,
        ca_bundle: &Path,
        certificate: &ClientCertificate,
    ) -> Result<CertificateSubject, ReviewError>;
}
