//! Public API trait for node auth.
//!
//! The serving layer calls this trait once per inbound request, before any
//! protected operation runs.

use async_trait::async_trait;

use crate::error::NodeAuthError;
use crate::models::{AuthRequest, AuthorizedRequest, Decision};

/// Public API trait for the node auth pipeline.
///
/// ```ignore
/// let decision = auth.authenticate_and_authorize(&request).await?;
/// ```
#[async_trait]
pub trait NodeAuthClient: Send + Sync {
    /// Authenticate the request, scope it to the node, and authorize it.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if no credential resolves to a principal
    /// - `InvalidInput` if the request cannot be scoped
    /// - `Authorization` if the authorizer could not reach a decision
    async fn authenticate_and_authorize(
        &self,
        request: &AuthRequest,
    ) -> Result<Decision, NodeAuthError>;

    /// Same pipeline as [`NodeAuthClient::authenticate_and_authorize`], also
    /// returning the resolved attributes (and through them, the principal).
    ///
    /// # Errors
    ///
    /// Same as [`NodeAuthClient::authenticate_and_authorize`].
    async fn authorize_request(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthorizedRequest, NodeAuthError>;
}
