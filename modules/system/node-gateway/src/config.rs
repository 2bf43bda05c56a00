use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:10250".to_owned()
}

fn default_public_paths() -> Vec<String> {
    vec!["/healthz".to_owned()]
}

/// Node gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NodeGatewayConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Route patterns served without authentication, in matchit syntax
    /// (`/healthz`, `/debug/{*rest}`).
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

impl Default for NodeGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_paths: default_public_paths(),
        }
    }
}
