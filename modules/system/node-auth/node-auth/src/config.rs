//! Configuration for node auth.
//!
//! Read once at startup; nothing here is consulted again per request.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeAuthConfig {
    /// Identity of the node every request is scoped to.
    pub node_name: String,

    pub authentication: AuthenticationConfig,

    pub authorization: AuthorizationConfig,

    pub cache: CacheConfig,
}

impl NodeAuthConfig {
    /// Node scope is required but no node identity is set, so every scoped
    /// request is rejected as invalid input.
    #[must_use]
    pub fn missing_node_scope(&self) -> bool {
        self.authorization.require_node_scope && self.node_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthenticationConfig {
    pub anonymous: AnonymousAuthConfig,
    pub webhook: WebhookAuthenticationConfig,
    pub x509: X509AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnonymousAuthConfig {
    /// Let credential-less requests through as `system:anonymous`.
    pub enabled: bool,
}

impl Default for AnonymousAuthConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookAuthenticationConfig {
    /// Review bearer tokens with the remote authority.
    pub enabled: bool,

    /// How long token review outcomes are cached.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
}

impl Default for WebhookAuthenticationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_ttl: Duration::from_secs(2 * 60),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct X509AuthConfig {
    /// CA bundle used to verify client certificates. Unset disables the
    /// client certificate path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ca_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// `AlwaysAllow` or `Webhook`. Validated when the authorizer is built.
    pub mode: String,

    pub webhook: WebhookAuthorizationConfig,

    /// Reject requests when the node identity is empty.
    pub require_node_scope: bool,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            mode: "AlwaysAllow".to_owned(),
            webhook: WebhookAuthorizationConfig::default(),
            require_node_scope: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookAuthorizationConfig {
    /// How long allow decisions are cached.
    #[serde(with = "humantime_serde")]
    pub cache_authorized_ttl: Duration,

    /// How long deny decisions are cached.
    #[serde(with = "humantime_serde")]
    pub cache_unauthorized_ttl: Duration,
}

impl Default for WebhookAuthorizationConfig {
    fn default() -> Self {
        Self {
            cache_authorized_ttl: Duration::from_secs(5 * 60),
            cache_unauthorized_ttl: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Upper bound on entries per cache. `0` means unbounded.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 4096 }
    }
}

mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_agent_defaults() {
        let cfg = NodeAuthConfig::default();

        assert!(cfg.authentication.anonymous.enabled);
        assert!(!cfg.authentication.webhook.enabled);
        assert_eq!(cfg.authentication.webhook.cache_ttl, Duration::from_secs(120));
        assert!(cfg.authentication.x509.client_ca_file.is_none());
        assert_eq!(cfg.authorization.mode, "AlwaysAllow");
        assert_eq!(
            cfg.authorization.webhook.cache_authorized_ttl,
            Duration::from_secs(300)
        );
        assert_eq!(
            cfg.authorization.webhook.cache_unauthorized_ttl,
            Duration::from_secs(30)
        );
        assert!(cfg.authorization.require_node_scope);
        assert_eq!(cfg.cache.max_entries, 4096);
    }

    #[test]
    fn missing_node_scope_needs_both_settings() {
        let mut cfg = NodeAuthConfig::default();
        assert!(cfg.missing_node_scope());

        cfg.node_name = "  ".to_owned();
        assert!(cfg.missing_node_scope());

        cfg.authorization.require_node_scope = false;
        assert!(!cfg.missing_node_scope());

        cfg.authorization.require_node_scope = true;
        cfg.node_name = "node-1".to_owned();
        assert!(!cfg.missing_node_scope());
    }

    #[test]
    fn parses_humantime_durations() {
        let cfg: NodeAuthConfig = serde_json::from_value(serde_json::json!({
            "node_name": "node-1",
            "authentication": {
                "anonymous": { "enabled": false },
                "webhook": { "enabled": true, "cache_ttl": "90s" },
                "x509": { "client_ca_file": "/etc/node/ca.pem" }
            },
            "authorization": {
                "mode": "Webhook",
                "webhook": { "cache_authorized_ttl": "1h", "cache_unauthorized_ttl": "0s" }
            }
        }))
        .unwrap();

        assert_eq!(cfg.node_name, "node-1");
        assert!(!cfg.authentication.anonymous.enabled);
        assert_eq!(cfg.authentication.webhook.cache_ttl, Duration::from_secs(90));
        assert_eq!(
            cfg.authentication.x509.client_ca_file,
            Some(PathBuf::from("/etc/node/ca.pem"))
        );
        assert_eq!(cfg.authorization.mode, "Webhook");
        assert_eq!(
            cfg.authorization.webhook.cache_authorized_ttl,
            Duration::from_secs(3600)
        );
        assert!(cfg.authorization.webhook.cache_unauthorized_ttl.is_zero());
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<NodeAuthConfig, _> = serde_json::from_value(serde_json::json!({
            "authorization": { "mode": "Webhook", "cache_ttl": "1m" }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn rejects_malformed_duration() {
        let res: Result<WebhookAuthorizationConfig, _> = serde_json::from_value(
            serde_json::json!({ "cache_authorized_ttl": "five minutes" }),
        );
        assert!(res.is_err());
    }
}
