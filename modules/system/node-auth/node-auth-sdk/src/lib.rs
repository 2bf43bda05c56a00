#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Node Auth SDK
//!
//! This crate provides the public API for the `node_auth` module:
//!
//! - [`NodeAuthClient`] - Public API trait for the serving layer
//! - [`TokenReviewClient`], [`SubjectAccessReviewClient`], [`ClientCertificateVerifier`] -
//!   Collaborator traits implemented by the remote authority and TLS layer
//! - [`AuthRequest`], [`AuthorizationAttributes`], [`Decision`] - Request and decision models
//! - [`NodeAuthError`], [`ReviewError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use node_auth_sdk::{AuthRequest, Credentials, NodeAuthClient};
//!
//! let request = AuthRequest::new(Credentials::bearer(token), action);
//! let decision = auth.authenticate_and_authorize(&request).await?;
//! if !decision.allowed {
//!     // reject with 403
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod review_api;

// Re-export main types at crate root
pub use api::NodeAuthClient;
pub use error::{NodeAuthError, ReviewError};
pub use models::{
    AuthRequest, AuthorizationAttributes, AuthorizedRequest, AuthorizerMode, CertificateSubject,
    ClientCertificate, Credentials, Decision, RequestedAction, ResourceAttributes,
    SubjectAccessReview, SubjectAccessReviewStatus, TokenReview, DEFAULT_SUBRESOURCE,
    NODES_RESOURCE,
};
pub use review_api::{ClientCertificateVerifier, SubjectAccessReviewClient, TokenReviewClient};
