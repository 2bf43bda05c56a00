//! Delegating authenticator.
//!
//! Strategies are tried in a fixed order, first match wins:
//! 1. anonymous, only when the request carries no credential at all
//! 2. client certificate, when a client CA bundle is configured
//! 3. bearer token, reviewed by the remote authority and cached by token digest

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use node_auth_sdk::{
    CertificateSubject, ClientCertificate, ClientCertificateVerifier, Credentials, TokenReview,
    TokenReviewClient,
};
use node_security::{AuthMethod, Principal, UserInfo};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::cache::TtlCache;
use super::error::DomainError;
use crate::config::{AuthenticationConfig, CacheConfig};

const NO_CREDENTIAL: &str = "no credential presented";

struct ClientCertAuthenticator {
    ca_bundle: PathBuf,
    verifier: Arc<dyn ClientCertificateVerifier>,
}

impl ClientCertAuthenticator {
    fn authenticate(&self, certificate: &ClientCertificate) -> Result<Principal, DomainError> {
        let subject = self
            .verifier
            .verify(&self.ca_bundle, certificate)
            .map_err(|e| DomainError::Unauthenticated(format!("client certificate rejected: {e}")))?;
        principal_from_subject(subject)
    }
}

struct TokenReviewAuthenticator {
    client: Arc<dyn TokenReviewClient>,
    cache: TtlCache<TokenReview>,
    cache_ttl: Duration,
}

impl TokenReviewAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let key = token_cache_key(token);

        let review = if let Some(cached) = self.cache.get(&key) {
            debug!("token review cache hit");
            cached
        } else {
            debug!("token review cache miss");
            let review = self.client.review_token(token).await.map_err(|e| {
                tracing::error!(error = %e, "token review call failed");
                DomainError::Unauthenticated(format!("token review failed: {e}"))
            })?;
            self.cache.put(key, review.clone(), self.cache_ttl);
            review
        };

        principal_from_review(review)
    }
}

/// Resolves a [`Principal`] from request credentials.
pub struct NodeAuthenticator {
    anonymous_enabled: bool,
    client_cert: Option<ClientCertAuthenticator>,
    token_review: Option<TokenReviewAuthenticator>,
}

impl NodeAuthenticator {
    /// Build the authenticator.
    ///
    /// # Errors
    ///
    /// - `MissingTokenReviewClient` when webhook authentication is enabled without a client
    /// - `MissingCertificateVerifier` when a client CA bundle is configured without a verifier
    pub fn new(
        cfg: &AuthenticationConfig,
        cache_cfg: &CacheConfig,
        token_client: Option<Arc<dyn TokenReviewClient>>,
        cert_verifier: Option<Arc<dyn ClientCertificateVerifier>>,
    ) -> Result<Self, DomainError> {
        let token_review = if cfg.webhook.enabled {
            let client = token_client.ok_or(DomainError::MissingTokenReviewClient)?;
            Some(TokenReviewAuthenticator {
                client,
                cache: TtlCache::new(cache_cfg.max_entries),
                cache_ttl: cfg.webhook.cache_ttl,
            })
        } else {
            if token_client.is_some() {
                debug!("token review client provided but webhook authentication is disabled");
            }
            None
        };

        let client_cert = match &cfg.x509.client_ca_file {
            Some(ca_bundle) => {
                let verifier = cert_verifier.ok_or_else(|| {
                    DomainError::MissingCertificateVerifier(ca_bundle.display().to_string())
                })?;
                Some(ClientCertAuthenticator {
                    ca_bundle: ca_bundle.clone(),
                    verifier,
                })
            }
            None => None,
        };

        if cfg.anonymous.enabled {
            warn!("anonymous access is enabled, credential-less requests run as system:anonymous");
        }
        info!(
            anonymous = cfg.anonymous.enabled,
            client_cert = client_cert.is_some(),
            webhook = token_review.is_some(),
            cache_ttl = ?cfg.webhook.cache_ttl,
            "Built node authenticator"
        );

        Ok(Self {
            anonymous_enabled: cfg.anonymous.enabled,
            client_cert,
            token_review,
        })
    }

    /// Resolve the principal for one request.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when no strategy accepts the credentials.
    #[tracing::instrument(skip_all, fields(method))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, DomainError> {
        if credentials.is_empty() {
            return if self.anonymous_enabled {
                tracing::Span::current().record("method", "anonymous");
                Ok(Principal::anonymous())
            } else {
                Err(DomainError::Unauthenticated(NO_CREDENTIAL.to_owned()))
            };
        }

        let mut cert_error = None;
        if let (Some(certificate), Some(step)) = (&credentials.client_certificate, &self.client_cert)
        {
            match step.authenticate(certificate) {
                Ok(principal) => {
                    tracing::Span::current().record("method", "client_cert");
                    return Ok(principal);
                }
                Err(e) => {
                    debug!(error = %e, "client certificate authentication failed");
                    cert_error = Some(e);
                }
            }
        }

        if let Some(token) = &credentials.bearer_token {
            let Some(step) = &self.token_review else {
                return Err(DomainError::Unauthenticated(
                    "bearer token presented but webhook authentication is not enabled".to_owned(),
                ));
            };
            tracing::Span::current().record("method", "webhook");
            return step.authenticate(token.expose_secret()).await;
        }

        Err(cert_error.unwrap_or_else(|| DomainError::Unauthenticated(NO_CREDENTIAL.to_owned())))
    }
}

/// Cache key for a bearer token (hex SHA-256 of the token).
fn token_cache_key(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn principal_from_subject(subject: CertificateSubject) -> Result<Principal, DomainError> {
    if subject.common_name.is_empty() {
        return Err(DomainError::Unauthenticated(
            "client certificate has no common name".to_owned(),
        ));
    }
    let user = UserInfo {
        name: subject.common_name,
        groups: subject.organizations.into_iter().collect(),
        extra: BTreeMap::new(),
    };
    Ok(Principal::authenticated(user, AuthMethod::ClientCert))
}

fn principal_from_review(review: TokenReview) -> Result<Principal, DomainError> {
    if !review.authenticated {
        let reason = review.error.unwrap_or_else(|| "invalid bearer token".to_owned());
        return Err(DomainError::Unauthenticated(reason));
    }
    match review.user {
        Some(user) if !user.name.is_empty() => {
            Ok(Principal::authenticated(user, AuthMethod::Webhook))
        }
        _ => Err(DomainError::Unauthenticated(
            "token review returned no user".to_owned(),
        )),
    }
}
