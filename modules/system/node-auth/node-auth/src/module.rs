//! Node auth module entry point.

use std::sync::Arc;

use node_auth_sdk::{NodeAuthClient, NodeAuthError};
use tracing::info;

use crate::config::NodeAuthConfig;
use crate::domain::{Collaborators, NodeAuthLocalClient, Service};

/// Build the node auth pipeline and return it behind its public trait.
///
/// Every configuration problem surfaces here, before any request is served.
///
/// # Errors
///
/// `NodeAuthError::Config` for an invalid mode or a missing collaborator.
#[tracing::instrument(skip_all, fields(node = %cfg.node_name, mode = %cfg.authorization.mode))]
pub fn init(
    cfg: &NodeAuthConfig,
    collaborators: Collaborators,
) -> Result<Arc<dyn NodeAuthClient>, NodeAuthError> {
    info!("Initializing node_auth");

    let svc = Arc::new(Service::from_config(cfg, collaborators)?);
    let api: Arc<dyn NodeAuthClient> = Arc::new(NodeAuthLocalClient::new(svc));

    info!("node_auth ready");
    Ok(api)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_config_initializes() {
        assert!(init(&NodeAuthConfig::default(), Collaborators::default()).is_ok());
    }

    #[test]
    fn missing_mode_is_a_config_error() {
        let mut cfg = NodeAuthConfig::default();
        cfg.authorization.mode = String::new();

        match init(&cfg, Collaborators::default()) {
            Err(NodeAuthError::Config(msg)) => assert_eq!(msg, "no authorization mode specified"),
            Err(other) => panic!("Expected Config, got: {other:?}"),
            Ok(_) => panic!("Expected Config error"),
        }
    }

    #[test]
    fn webhook_without_client_is_a_config_error() {
        let mut cfg = NodeAuthConfig::default();
        cfg.authentication.webhook.enabled = true;

        match init(&cfg, Collaborators::default()) {
            Err(NodeAuthError::Config(msg)) => {
                assert_eq!(msg, "missing client for webhook authentication");
            }
            Err(other) => panic!("Expected Config, got: {other:?}"),
            Ok(_) => panic!("Expected Config error"),
        }
    }
}
