#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode},
    routing::get,
};
use node_auth::Collaborators;
use node_auth::config::NodeAuthConfig;
use node_auth_sdk::{
    AuthRequest, AuthorizationAttributes, AuthorizedRequest, AuthorizerMode, ClientCertificate,
    Decision, NodeAuthClient, NodeAuthError,
};
use node_gateway::{AuthState, NodeGatewayConfig, protect};
use node_security::{AuthMethod, Principal};
use parking_lot::Mutex;
use tower::ServiceExt;

/// Outcome the mock pipeline reports.
#[derive(Clone)]
enum Outcome {
    Allow,
    Deny,
    Fail(fn() -> NodeAuthError),
}

struct MockNodeAuthClient {
    outcome: Outcome,
    calls: AtomicUsize,
    last_request: Mutex<Option<AuthRequest>>,
}

impl MockNodeAuthClient {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait]
impl NodeAuthClient for MockNodeAuthClient {
    async fn authenticate_and_authorize(
        &self,
        request: &AuthRequest,
    ) -> Result<Decision, NodeAuthError> {
        self.authorize_request(request).await.map(|a| a.decision)
    }

    async fn authorize_request(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthorizedRequest, NodeAuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());

        let attributes = AuthorizationAttributes {
            principal: Principal::builder(AuthMethod::Webhook).name("alice").build(),
            verb: request.action.verb.clone(),
            resource: request.action.resource.clone(),
            subresource: request.action.subresource.clone(),
            name: Some("node-1".to_owned()),
            namespace: None,
            node: "node-1".to_owned(),
            path: request.action.path.clone(),
        };
        let decision = match &self.outcome {
            Outcome::Allow => Decision::allow("ok", AuthorizerMode::Webhook),
            Outcome::Deny => Decision::deny("denied by policy", AuthorizerMode::Webhook),
            Outcome::Fail(err) => return Err(err()),
        };
        Ok(AuthorizedRequest {
            attributes,
            decision,
        })
    }
}

async fn whoami(Extension(principal): Extension<Principal>) -> String {
    principal.name().to_owned()
}

async fn healthz() -> &'static str {
    "ok"
}

fn router(auth: Arc<dyn NodeAuthClient>) -> Router {
    let routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/stats/summary", get(whoami))
        .route("/pods", get(whoami));
    let state = AuthState::new(auth, &NodeGatewayConfig::default()).unwrap();
    protect(routes, state)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn allowed_request_reaches_handler_with_principal() -> Result<()> {
    let mock = MockNodeAuthClient::new(Outcome::Allow);
    let response = router(mock.clone())
        .oneshot(get_with_token("/stats/summary", "abc"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"alice");

    let last = mock.last_request.lock().clone().unwrap();
    assert_eq!(last.action.verb, "get");
    assert_eq!(last.action.resource, "nodes");
    assert_eq!(last.action.subresource.as_deref(), Some("stats"));
    assert_eq!(last.action.path.as_deref(), Some("/stats/summary"));
    assert!(last.credentials.bearer_token.is_some());
    Ok(())
}

#[tokio::test]
async fn public_route_skips_auth() {
    let mock = MockNodeAuthClient::new(Outcome::Fail(|| {
        NodeAuthError::Unauthenticated("never".to_owned())
    }));
    let response = router(mock.clone())
        .oneshot(get_request("/healthz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn denied_request_returns_403_with_attributes() {
    let mock = MockNodeAuthClient::new(Outcome::Deny);
    let response = router(mock)
        .oneshot(get_with_token("/pods", "abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
    let body = body_json(response).await;
    assert_eq!(
        body["detail"],
        "Forbidden (user=alice, verb=get, resource=nodes, subresource=proxy)"
    );
}

#[tokio::test]
async fn unauthenticated_returns_401() {
    let mock = MockNodeAuthClient::new(Outcome::Fail(|| {
        NodeAuthError::Unauthenticated("no credential presented".to_owned())
    }));
    let response = router(mock).oneshot(get_request("/pods")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["status"], 401);
}

#[tokio::test]
async fn malformed_authorization_header_returns_401_without_calling_pipeline() {
    let mock = MockNodeAuthClient::new(Outcome::Allow);
    let request = Request::builder()
        .uri("/pods")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = router(mock.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn authorization_failure_returns_503() {
    let mock = MockNodeAuthClient::new(Outcome::Fail(|| {
        NodeAuthError::Authorization("review service unavailable".to_owned())
    }));
    let response = router(mock)
        .oneshot(get_with_token("/pods", "abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn invalid_input_returns_400() {
    let mock = MockNodeAuthClient::new(Outcome::Fail(|| {
        NodeAuthError::InvalidInput("request has no verb".to_owned())
    }));
    let response = router(mock)
        .oneshot(get_with_token("/pods", "abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "request has no verb");
}

#[tokio::test]
async fn client_certificate_extension_is_forwarded() {
    let mock = MockNodeAuthClient::new(Outcome::Allow);
    let mut request = get_request("/pods");
    request
        .extensions_mut()
        .insert(ClientCertificate::new(vec![b"leaf".to_vec()]));

    let response = router(mock.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let last = mock.last_request.lock().clone().unwrap();
    assert_eq!(
        last.credentials.client_certificate.unwrap().leaf(),
        Some(&b"leaf"[..])
    );
    assert!(last.credentials.bearer_token.is_none());
}

#[tokio::test]
async fn anonymous_request_through_real_pipeline() {
    let cfg = NodeAuthConfig {
        node_name: "node-1".to_owned(),
        ..NodeAuthConfig::default()
    };
    let auth = node_auth::init(&cfg, Collaborators::default()).unwrap();
    let response = router(auth).oneshot(get_request("/pods")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"system:anonymous");
}

#[tokio::test]
async fn missing_node_identity_returns_400_through_real_pipeline() {
    let auth = node_auth::init(&NodeAuthConfig::default(), Collaborators::default()).unwrap();
    let response = router(auth).oneshot(get_request("/pods")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
