//! Service implementation for the static token review plugin.

use std::collections::HashMap;

use node_auth_sdk::TokenReview;
use node_security::UserInfo;

use crate::config::{IdentityConfig, StaticTokenReviewConfig, TokenReviewMode};

/// Static token review service.
///
/// Provides token-to-identity mapping based on configuration mode:
/// - `accept_all`: Any non-empty token maps to the default identity
/// - `static_tokens`: Specific tokens map to specific identities
pub struct Service {
    mode: TokenReviewMode,
    default_identity: IdentityConfig,
    token_map: HashMap<String, IdentityConfig>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticTokenReviewConfig) -> Self {
        let token_map: HashMap<String, IdentityConfig> = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.clone()))
            .collect();

        tracing::info!(mode = ?cfg.mode, tokens = token_map.len(), "Static token reviewer configured");
        Self {
            mode: cfg.mode,
            default_identity: cfg.default_identity.clone(),
            token_map,
        }
    }

    /// Review a bearer token.
    ///
    /// An empty or unknown token yields a not-authenticated review.
    #[must_use]
    pub fn review(&self, bearer_token: &str) -> TokenReview {
        if bearer_token.is_empty() {
            return TokenReview::rejected("empty token");
        }

        let identity = match self.mode {
            TokenReviewMode::AcceptAll => Some(&self.default_identity),
            TokenReviewMode::StaticTokens => self.token_map.get(bearer_token),
        };

        match identity {
            Some(identity) => TokenReview::authenticated(user_info(identity)),
            None => TokenReview::rejected("unknown token"),
        }
    }
}

fn user_info(identity: &IdentityConfig) -> UserInfo {
    UserInfo {
        name: identity.name.clone(),
        groups: identity.groups.iter().cloned().collect(),
        extra: identity.extra.clone(),
    }
}
