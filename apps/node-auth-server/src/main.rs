//! Node auth server: serves the node API behind the node auth pipeline.

mod config;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use node_auth::Collaborators;
use static_access_review_plugin::StaticAccessReviewer;
use static_token_review_plugin::StaticTokenReviewer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, LogFormat, LoggingConfig, ReviewBackend};

/// Node API server gated by delegated authentication and authorization.
#[derive(Parser, Debug)]
#[command(name = "node-auth-server", version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and the auth pipeline, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    init_tracing(&cfg.logging)?;

    tracing::info!(
        node = %cfg.auth.node_name,
        review_backend = ?cfg.review_backend,
        "Starting node-auth-server"
    );

    let auth = node_auth::init(&cfg.auth, collaborators(&cfg))
        .context("failed to initialize node auth")?;
    if cli.check {
        check(&cfg)?;
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let router = server::router(&cfg.auth.node_name, auth, &cfg.gateway)?;
    server::serve(router, &cfg.gateway.bind_addr).await
}

/// Settings that build a working pipeline but cannot serve the node API.
fn check(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.auth.missing_node_scope() {
        anyhow::bail!(
            "auth.node_name is empty while auth.authorization.require_node_scope is set: \
             every gated request would be rejected"
        );
    }
    Ok(())
}

fn collaborators(cfg: &AppConfig) -> Collaborators {
    match cfg.review_backend {
        ReviewBackend::None => Collaborators::default(),
        ReviewBackend::Static => Collaborators::default()
            .with_token_review(Arc::new(StaticTokenReviewer::from_config(&cfg.token_review)))
            .with_access_review(Arc::new(StaticAccessReviewer::from_config(
                &cfg.access_review,
            ))),
    }
}

fn init_tracing(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match cfg.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
