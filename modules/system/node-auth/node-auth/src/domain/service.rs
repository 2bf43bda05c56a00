//! Node auth service.
//!
//! Runs the pipeline for one request: authenticate, scope, authorize.

use std::sync::Arc;

use node_auth_sdk::{
    AuthRequest, AuthorizedRequest, ClientCertificateVerifier, Decision,
    SubjectAccessReviewClient, TokenReviewClient,
};
use tracing::{debug, info, warn};

use super::authenticator::NodeAuthenticator;
use super::authorizer::NodeAuthorizer;
use super::error::DomainError;
use super::scoper::NodeAttributeScoper;
use crate::config::NodeAuthConfig;

/// External collaborators the pipeline delegates to.
///
/// A field may stay `None` when the configuration never needs it.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub token_review: Option<Arc<dyn TokenReviewClient>>,
    pub access_review: Option<Arc<dyn SubjectAccessReviewClient>>,
    pub certificate_verifier: Option<Arc<dyn ClientCertificateVerifier>>,
}

impl Collaborators {
    #[must_use]
    pub fn with_token_review(mut self, client: Arc<dyn TokenReviewClient>) -> Self {
        self.token_review = Some(client);
        self
    }

    #[must_use]
    pub fn with_access_review(mut self, client: Arc<dyn SubjectAccessReviewClient>) -> Self {
        self.access_review = Some(client);
        self
    }

    #[must_use]
    pub fn with_certificate_verifier(mut self, verifier: Arc<dyn ClientCertificateVerifier>) -> Self {
        self.certificate_verifier = Some(verifier);
        self
    }
}

/// Node auth service.
pub struct Service {
    authenticator: NodeAuthenticator,
    scoper: NodeAttributeScoper,
    authorizer: NodeAuthorizer,
}

impl Service {
    #[must_use]
    pub fn new(
        authenticator: NodeAuthenticator,
        scoper: NodeAttributeScoper,
        authorizer: NodeAuthorizer,
    ) -> Self {
        Self {
            authenticator,
            scoper,
            authorizer,
        }
    }

    /// Build the whole pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Any construction error of the authenticator or authorizer. All of them
    /// surface as `NodeAuthError::Config`.
    pub fn from_config(cfg: &NodeAuthConfig, collaborators: Collaborators) -> Result<Self, DomainError> {
        let authenticator = NodeAuthenticator::new(
            &cfg.authentication,
            &cfg.cache,
            collaborators.token_review,
            collaborators.certificate_verifier,
        )?;
        let authorizer = NodeAuthorizer::new(
            &cfg.authorization,
            &cfg.cache,
            collaborators.access_review,
        )?;
        let scoper = NodeAttributeScoper::new(
            cfg.node_name.clone(),
            cfg.authorization.require_node_scope,
        );

        if cfg.missing_node_scope() {
            warn!("node_name is empty but node scope is required; scoped requests will be rejected");
        }
        info!(node = %scoper.node_name(), mode = %authorizer.mode(), "Built node auth pipeline");
        Ok(Self::new(authenticator, scoper, authorizer))
    }

    /// Authenticate, scope and authorize one request.
    ///
    /// Authorization is never consulted for a request that fails authentication.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `InvalidInput`, or `AccessReviewFailed`.
    #[tracing::instrument(skip_all, fields(verb = %request.action.verb, resource = %request.action.resource))]
    pub async fn authorize_request(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthorizedRequest, DomainError> {
        let principal = self.authenticator.authenticate(&request.credentials).await?;
        let attributes = self.scoper.scope(principal, &request.action)?;
        let decision = self.authorizer.authorize(&attributes).await?;

        debug!(
            user = %attributes.principal.name(),
            allowed = decision.allowed,
            reason = %decision.reason,
            "Authorization decided"
        );
        Ok(AuthorizedRequest {
            attributes,
            decision,
        })
    }

    /// [`Service::authorize_request`] without the resolved attributes.
    ///
    /// # Errors
    ///
    /// Same as [`Service::authorize_request`].
    pub async fn authenticate_and_authorize(
        &self,
        request: &AuthRequest,
    ) -> Result<Decision, DomainError> {
        self.authorize_request(request)
            .await
            .map(|authorized| authorized.decision)
    }
}
