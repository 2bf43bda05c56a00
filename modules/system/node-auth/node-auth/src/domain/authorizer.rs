//! Node authorizer.
//!
//! The mode is chosen once at construction. In webhook mode every decision
//! comes from a subject access review, cached with one TTL for allow outcomes
//! and an independent TTL for deny outcomes. Failed reviews are never cached
//! and never turn into an allow.

use std::sync::Arc;
use std::time::Duration;

use node_auth_sdk::{
    AuthorizationAttributes, AuthorizerMode, Decision, SubjectAccessReview,
    SubjectAccessReviewClient, SubjectAccessReviewStatus,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::cache::TtlCache;
use super::error::DomainError;
use crate::config::{AuthorizationConfig, CacheConfig};

pub const ALWAYS_ALLOW_REASON: &str = "always allow mode";

/// Parse the configured mode string.
///
/// # Errors
///
/// `NoAuthorizationMode` for an empty string, `UnknownAuthorizationMode` for
/// anything other than `AlwaysAllow` or `Webhook`.
pub fn parse_mode(mode: &str) -> Result<AuthorizerMode, DomainError> {
    match mode {
        "AlwaysAllow" => Ok(AuthorizerMode::AlwaysAllow),
        "Webhook" => Ok(AuthorizerMode::Webhook),
        "" => Err(DomainError::NoAuthorizationMode),
        other => Err(DomainError::UnknownAuthorizationMode(other.to_owned())),
    }
}

struct WebhookAuthorizer {
    client: Arc<dyn SubjectAccessReviewClient>,
    cache: TtlCache<Decision>,
    allow_ttl: Duration,
    deny_ttl: Duration,
}

impl WebhookAuthorizer {
    async fn authorize(&self, attrs: &AuthorizationAttributes) -> Result<Decision, DomainError> {
        let review = SubjectAccessReview::from_attributes(attrs);
        let key = review_cache_key(&review)?;

        if let Some(decision) = self.cache.get(&key) {
            debug!(allowed = decision.allowed, "subject access review cache hit");
            return Ok(decision);
        }

        let status = self.client.review_access(&review).await.map_err(|e| {
            tracing::error!(error = %e, "subject access review call failed");
            DomainError::AccessReviewFailed(e)
        })?;

        let decision = decision_from_status(status);
        let ttl = if decision.allowed {
            self.allow_ttl
        } else {
            self.deny_ttl
        };
        debug!(allowed = decision.allowed, ?ttl, "caching subject access review");
        self.cache.put(key, decision.clone(), ttl);

        Ok(decision)
    }
}

enum Mode {
    AlwaysAllow,
    Webhook(WebhookAuthorizer),
}

/// Decides whether scoped attributes are allowed.
pub struct NodeAuthorizer {
    mode: Mode,
}

impl NodeAuthorizer {
    /// Build the authorizer for the configured mode.
    ///
    /// # Errors
    ///
    /// - `NoAuthorizationMode` / `UnknownAuthorizationMode` for an invalid mode string
    /// - `MissingAccessReviewClient` for webhook mode without a client
    pub fn new(
        cfg: &AuthorizationConfig,
        cache_cfg: &CacheConfig,
        client: Option<Arc<dyn SubjectAccessReviewClient>>,
    ) -> Result<Self, DomainError> {
        let mode = match parse_mode(&cfg.mode)? {
            AuthorizerMode::AlwaysAllow => Mode::AlwaysAllow,
            AuthorizerMode::Webhook => {
                let client = client.ok_or(DomainError::MissingAccessReviewClient)?;
                Mode::Webhook(WebhookAuthorizer {
                    client,
                    cache: TtlCache::new(cache_cfg.max_entries),
                    allow_ttl: cfg.webhook.cache_authorized_ttl,
                    deny_ttl: cfg.webhook.cache_unauthorized_ttl,
                })
            }
        };

        let authorizer = Self { mode };
        info!(
            mode = %authorizer.mode(),
            allow_ttl = ?cfg.webhook.cache_authorized_ttl,
            deny_ttl = ?cfg.webhook.cache_unauthorized_ttl,
            "Built node authorizer"
        );
        Ok(authorizer)
    }

    #[must_use]
    pub fn mode(&self) -> AuthorizerMode {
        match self.mode {
            Mode::AlwaysAllow => AuthorizerMode::AlwaysAllow,
            Mode::Webhook(_) => AuthorizerMode::Webhook,
        }
    }

    /// Decide on `attrs`.
    ///
    /// # Errors
    ///
    /// `AccessReviewFailed` when the remote review cannot be completed.
    #[tracing::instrument(skip_all, fields(mode = %self.mode(), user = %attrs.principal.name(), verb = %attrs.verb))]
    pub async fn authorize(&self, attrs: &AuthorizationAttributes) -> Result<Decision, DomainError> {
        match &self.mode {
            Mode::AlwaysAllow => Ok(Decision::allow(
                ALWAYS_ALLOW_REASON,
                AuthorizerMode::AlwaysAllow,
            )),
            Mode::Webhook(webhook) => webhook.authorize(attrs).await,
        }
    }
}

/// Cache key for a review (hex SHA-256 of its canonical JSON form).
fn review_cache_key(review: &SubjectAccessReview) -> Result<String, DomainError> {
    let bytes = serde_json::to_vec(review)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Allowed only when the authority allowed and did not also deny.
fn decision_from_status(status: SubjectAccessReviewStatus) -> Decision {
    if status.allowed && !status.denied {
        Decision::allow(status.reason, AuthorizerMode::Webhook)
    } else {
        Decision::deny(status.reason, AuthorizerMode::Webhook)
    }
}
