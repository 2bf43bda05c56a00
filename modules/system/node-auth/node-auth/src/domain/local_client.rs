//! Local (in-process) client for node auth.

use std::sync::Arc;

use async_trait::async_trait;
use node_auth_sdk::{AuthRequest, AuthorizedRequest, Decision, NodeAuthClient, NodeAuthError};

use super::{DomainError, Service};

/// Local client wrapping the service.
///
/// Handed to the gateway by [`crate::init`].
pub struct NodeAuthLocalClient {
    svc: Arc<Service>,
}

impl NodeAuthLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> NodeAuthError {
    match &e {
        DomainError::Unauthenticated(_) | DomainError::InvalidInput(_) => {
            tracing::debug!(operation = op, error = %e, "node_auth request rejected");
        }
        _ => tracing::error!(operation = op, error = ?e, "node_auth call failed"),
    }
    e.into()
}

#[async_trait]
impl NodeAuthClient for NodeAuthLocalClient {
    async fn authenticate_and_authorize(
        &self,
        request: &AuthRequest,
    ) -> Result<Decision, NodeAuthError> {
        self.svc
            .authenticate_and_authorize(request)
            .await
            .map_err(|e| log_and_convert("authenticate_and_authorize", e))
    }

    async fn authorize_request(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthorizedRequest, NodeAuthError> {
        self.svc
            .authorize_request(request)
            .await
            .map_err(|e| log_and_convert("authorize_request", e))
    }
}
