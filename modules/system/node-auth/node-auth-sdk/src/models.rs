//! Domain models for the node auth module.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use node_security::{Principal, UserInfo};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// DER-encoded client certificate chain, leaf first.
///
/// Inserted into the request by the TLS layer after the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    chain: Vec<Vec<u8>>,
}

impl ClientCertificate {
    #[must_use]
    pub fn new(chain: Vec<Vec<u8>>) -> Self {
        Self { chain }
    }

    #[must_use]
    pub fn chain(&self) -> &[Vec<u8>] {
        &self.chain
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&[u8]> {
        self.chain.first().map(Vec::as_slice)
    }
}

/// Raw credentials presented with a request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Bearer token without the `Bearer ` prefix. Redacted in `Debug`.
    pub bearer_token: Option<SecretString>,
    pub client_certificate: Option<ClientCertificate>,
}

impl Credentials {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(SecretString::from(token.into())),
            client_certificate: None,
        }
    }

    #[must_use]
    pub fn certificate(certificate: ClientCertificate) -> Self {
        Self {
            bearer_token: None,
            client_certificate: Some(certificate),
        }
    }

    /// True when neither a bearer token nor a client certificate is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bearer_token.is_none() && self.client_certificate.is_none()
    }
}

/// Resource type of the node object itself.
pub const NODES_RESOURCE: &str = "nodes";

/// Subresource used for node API paths with no finer-grained mapping.
pub const DEFAULT_SUBRESOURCE: &str = "proxy";

/// Node API path prefixes with their own subresource.
const SUBRESOURCE_PATHS: &[(&str, &str)] = &[
    ("/stats", "stats"),
    ("/metrics", "metrics"),
    ("/logs", "log"),
    ("/spec", "spec"),
];

/// The action a request asks for, before it is scoped to the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAction {
    /// API verb, e.g. "get", "list", "create".
    pub verb: String,
    /// Resource type, e.g. "nodes".
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Request path on the node API; forwarded to access reviews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RequestedAction {
    #[must_use]
    pub fn new(verb: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            resource: resource.into(),
            ..Self::default()
        }
    }

    /// Map an HTTP request on the node API to a `nodes` action.
    ///
    /// Unknown methods produce an empty verb, which attribute scoping rejects.
    #[must_use]
    pub fn from_http(method: &str, path: &str) -> Self {
        let verb = match method {
            "POST" => "create",
            "GET" => "get",
            "PUT" => "update",
            "PATCH" => "patch",
            "DELETE" => "delete",
            _ => "",
        };

        let subresource = SUBRESOURCE_PATHS
            .iter()
            .find(|(prefix, _)| is_subpath(path, prefix))
            .map_or(DEFAULT_SUBRESOURCE, |(_, sub)| *sub);

        Self::new(verb, NODES_RESOURCE)
            .subresource(subresource)
            .path(path)
    }

    #[must_use]
    pub fn subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = Some(subresource.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// `path` equals `prefix` or lies below it on a segment boundary.
fn is_subpath(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Everything the pipeline needs from one inbound request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub credentials: Credentials,
    pub action: RequestedAction,
}

impl AuthRequest {
    #[must_use]
    pub fn new(credentials: Credentials, action: RequestedAction) -> Self {
        Self {
            credentials,
            action,
        }
    }
}

/// Normalized "who wants to do what to what", scoped to a node.
///
/// Produced once per request by the attribute scoper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationAttributes {
    pub principal: Principal,
    pub verb: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Node this request is implicitly scoped to.
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Authorizer mode, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizerMode {
    AlwaysAllow,
    Webhook,
}

impl AuthorizerMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysAllow => "AlwaysAllow",
            Self::Webhook => "Webhook",
        }
    }
}

impl fmt::Display for AuthorizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    /// Human-readable reason.
    pub reason: String,
    pub evaluated_mode: AuthorizerMode,
}

impl Decision {
    #[must_use]
    pub fn allow(reason: impl Into<String>, mode: AuthorizerMode) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            evaluated_mode: mode,
        }
    }

    #[must_use]
    pub fn deny(reason: impl Into<String>, mode: AuthorizerMode) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            evaluated_mode: mode,
        }
    }
}

/// Attributes and decision for one request.
#[derive(Debug, Clone)]
pub struct AuthorizedRequest {
    pub attributes: AuthorizationAttributes,
    pub decision: Decision,
}

impl AuthorizedRequest {
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.attributes.principal
    }
}

/// Result of a remote token review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReview {
    pub authenticated: bool,
    /// Reviewed identity; present when `authenticated` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    /// Why the token was not accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenReview {
    #[must_use]
    pub fn authenticated(user: UserInfo) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
            error: None,
        }
    }

    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            user: None,
            error: Some(error.into()),
        }
    }
}

/// Subject fields of a verified client certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateSubject {
    pub common_name: String,
    pub organizations: Vec<String>,
}

/// Resource part of a subject access review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub verb: String,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Request path on the node API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Question sent to the remote authority: may this user do this?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAccessReview {
    pub user: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, Vec<String>>,
    pub resource_attributes: ResourceAttributes,
}

impl SubjectAccessReview {
    #[must_use]
    pub fn from_attributes(attrs: &AuthorizationAttributes) -> Self {
        Self {
            user: attrs.principal.name().to_owned(),
            groups: attrs.principal.groups().clone(),
            extra: attrs.principal.extra().clone(),
            resource_attributes: ResourceAttributes {
                namespace: attrs.namespace.clone(),
                verb: attrs.verb.clone(),
                resource: attrs.resource.clone(),
                subresource: attrs.subresource.clone(),
                name: attrs.name.clone(),
                path: attrs.path.clone(),
            },
        }
    }
}

/// Answer from the remote authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAccessReviewStatus {
    pub allowed: bool,
    /// Explicit deny, as opposed to "no opinion".
    #[serde(default)]
    pub denied: bool,
    #[serde(default)]
    pub reason: String,
}
