use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, StatusCode, header};
use node_auth_sdk::{
    AuthRequest, AuthorizedRequest, ClientCertificate, Credentials, NodeAuthClient, NodeAuthError,
    RequestedAction,
};

use crate::config::NodeGatewayConfig;
use crate::problem::Problem;

/// Errors raised while building the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to insert public route pattern '{path}': {source}")]
    InvalidPublicRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },
}

/// Matcher for routes served without authentication.
#[derive(Clone)]
pub struct PublicRouteMatcher {
    matcher: matchit::Router<()>,
}

impl PublicRouteMatcher {
    fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    /// Build a matcher from route patterns.
    ///
    /// # Errors
    ///
    /// `InvalidPublicRoute` for a malformed or conflicting pattern.
    pub fn from_paths<I, S>(paths: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::new();
        for path in paths {
            let path = path.as_ref();
            matcher
                .matcher
                .insert(path, ())
                .map_err(|source| GatewayError::InvalidPublicRoute {
                    path: path.to_owned(),
                    source,
                })?;
        }
        Ok(matcher)
    }

    #[must_use]
    pub fn find(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Shared state for the node auth middleware.
#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<dyn NodeAuthClient>,
    pub public_routes: PublicRouteMatcher,
}

impl AuthState {
    /// # Errors
    ///
    /// `InvalidPublicRoute` when a configured public path is not a valid pattern.
    pub fn new(auth: Arc<dyn NodeAuthClient>, cfg: &NodeGatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            auth,
            public_routes: PublicRouteMatcher::from_paths(&cfg.public_paths)?,
        })
    }
}

/// Wrap every route of `router` with [`node_auth_middleware`].
#[must_use]
pub fn protect(router: Router, state: AuthState) -> Router {
    router.layer(axum::middleware::from_fn_with_state(
        state,
        node_auth_middleware,
    ))
}

/// Authentication and authorization middleware for the node API.
///
/// For each request:
/// 1. Public routes pass through untouched
/// 2. Credentials are collected from the `Authorization` header and the
///    `ClientCertificate` extension left by the TLS layer
/// 3. The request is mapped to a node API action and run through the pipeline
/// 4. On allow, the `Principal` is inserted into request extensions
pub async fn node_auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if state.public_routes.find(req.uri().path()) {
        return next.run(req).await;
    }

    let Ok(bearer_token) = extract_bearer_token(req.headers()) else {
        return Problem::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Missing or invalid Authorization header",
        )
        .into_response();
    };

    let credentials = Credentials {
        bearer_token: bearer_token.map(|t| t.to_owned().into()),
        client_certificate: req.extensions().get::<ClientCertificate>().cloned(),
    };
    let action = RequestedAction::from_http(req.method().as_str(), req.uri().path());
    let request = AuthRequest::new(credentials, action);

    match state.auth.authorize_request(&request).await {
        Ok(authorized) if authorized.decision.allowed => {
            req.extensions_mut().insert(authorized.attributes.principal);
            next.run(req).await
        }
        Ok(authorized) => forbidden(&authorized),
        Err(err) => auth_error_to_response(&err),
    }
}

fn forbidden(authorized: &AuthorizedRequest) -> Response {
    let attrs = &authorized.attributes;
    tracing::debug!(
        user = %attrs.principal.name(),
        reason = %authorized.decision.reason,
        "node API request denied"
    );
    let detail = format!(
        "Forbidden (user={}, verb={}, resource={}, subresource={})",
        attrs.principal.name(),
        attrs.verb,
        attrs.resource,
        attrs.subresource.as_deref().unwrap_or_default(),
    );
    Problem::new(StatusCode::FORBIDDEN, "Forbidden", detail).into_response()
}

/// Convert `NodeAuthError` to an RFC-9457 Problem Details response.
fn auth_error_to_response(err: &NodeAuthError) -> Response {
    log_auth_error(err);
    let (status, title, detail) = match err {
        NodeAuthError::Unauthenticated(_) => (
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authentication failed",
        ),
        NodeAuthError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg.as_str()),
        NodeAuthError::Authorization(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "Authorization service unavailable",
        ),
        NodeAuthError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Internal authorization error",
        ),
    };
    Problem::new(status, title, detail).into_response()
}

/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_auth_error(err: &NodeAuthError) {
    match err {
        NodeAuthError::Unauthenticated(msg) => tracing::debug!("Node auth rejected: {msg}"),
        NodeAuthError::InvalidInput(msg) => tracing::debug!("Node auth invalid request: {msg}"),
        NodeAuthError::Authorization(msg) => tracing::error!("Node authorization failed: {msg}"),
        NodeAuthError::Config(msg) => tracing::error!("Node auth misconfigured: {msg}"),
    }
}

/// Extract the bearer token from the `Authorization` header.
///
/// `Ok(None)` when the header is absent; `Err` when it is present but not a
/// non-empty bearer token.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ()> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or(())
}
