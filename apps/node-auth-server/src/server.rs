//! Node API routes and serving.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};
use node_auth_sdk::NodeAuthClient;
use node_gateway::{AuthState, NodeGatewayConfig, protect};
use node_security::Principal;
use serde_json::{Value, json};

#[derive(Clone)]
struct NodeInfo {
    name: Arc<str>,
}

/// Build the node API router with every non-public route gated by node auth.
///
/// # Errors
///
/// A configured public path that is not a valid route pattern.
pub fn router(
    node_name: &str,
    auth: Arc<dyn NodeAuthClient>,
    cfg: &NodeGatewayConfig,
) -> anyhow::Result<Router> {
    let node = NodeInfo {
        name: Arc::from(node_name),
    };
    let routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/stats/summary", get(stats_summary))
        .route("/metrics", get(metrics))
        .route("/logs/{*path}", get(logs))
        .route("/spec", get(spec))
        .route("/pods", get(pods))
        .layer(Extension(node));

    let state = AuthState::new(auth, cfg)?;
    Ok(protect(routes, state))
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
///
/// An unparsable bind address, a bind failure, or a serve error.
pub async fn serve(router: Router, bind_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind_addr '{bind_addr}'"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn stats_summary(
    Extension(node): Extension<NodeInfo>,
    Extension(principal): Extension<Principal>,
) -> Json<Value> {
    Json(json!({
        "node": { "nodeName": &*node.name },
        "requestedBy": principal.name(),
    }))
}

async fn metrics() -> &'static str {
    "# node metrics\n"
}

async fn logs(Path(path): Path<String>, Extension(principal): Extension<Principal>) -> String {
    tracing::debug!(user = %principal.name(), %path, "log access");
    format!("log {path}\n")
}

async fn spec(Extension(node): Extension<NodeInfo>) -> Json<Value> {
    Json(json!({ "nodeName": &*node.name }))
}

async fn pods() -> Json<Value> {
    Json(json!({ "kind": "PodList", "items": [] }))
}
