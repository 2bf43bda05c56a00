//! Server configuration.
//!
//! Layered as: built-in defaults, then the YAML file, then `NODE_AUTH__`
//! environment variables (`NODE_AUTH__AUTH__NODE_NAME=node-7`).

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use node_auth::config::NodeAuthConfig;
use node_gateway::NodeGatewayConfig;
use serde::{Deserialize, Serialize};
use static_access_review_plugin::StaticAccessReviewConfig;
use static_token_review_plugin::StaticTokenReviewConfig;

pub const ENV_PREFIX: &str = "NODE_AUTH__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub gateway: NodeGatewayConfig,
    pub auth: NodeAuthConfig,
    /// Which remote authority answers token and access reviews.
    pub review_backend: ReviewBackend,
    /// Used when `review_backend` is `static`.
    pub token_review: StaticTokenReviewConfig,
    /// Used when `review_backend` is `static`.
    pub access_review: StaticAccessReviewConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewBackend {
    /// No remote authority. Webhook modes fail at startup.
    #[default]
    None,
    /// In-process static reviewers.
    Static,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Load the configuration.
///
/// # Errors
///
/// A missing or unreadable file, or a value that does not deserialize.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = path {
        anyhow::ensure!(path.is_file(), "config file {} not found", path.display());
        figment = figment.merge(Yaml::file(path));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("invalid configuration")
}
