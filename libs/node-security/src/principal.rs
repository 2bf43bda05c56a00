use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::{ANONYMOUS_USER, AUTHENTICATED_GROUP, UNAUTHENTICATED_GROUP};

/// How a principal proved its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// No credential was presented and anonymous access is enabled.
    Anonymous,
    /// A client certificate verified against the configured CA bundle.
    ClientCert,
    /// A bearer token accepted by the remote token review.
    Webhook,
}

/// User information as reported by an identity source.
///
/// Groups and extra values use ordered collections so two equal users
/// always serialize to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, Vec<String>>,
}

/// `Principal` is the identity resolved for a single request.
///
/// Built by the authenticator and handed to the attribute scoper. It is
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user: UserInfo,
    method: AuthMethod,
}

impl Principal {
    /// Create a new `Principal` builder
    #[must_use]
    pub fn builder(method: AuthMethod) -> PrincipalBuilder {
        PrincipalBuilder::new(method)
    }

    /// The principal used for credential-less requests when anonymous access is enabled.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::builder(AuthMethod::Anonymous)
            .name(ANONYMOUS_USER)
            .group(UNAUTHENTICATED_GROUP)
            .build()
    }

    /// Wrap reviewed user information, adding `system:authenticated`.
    #[must_use]
    pub fn authenticated(user: UserInfo, method: AuthMethod) -> Self {
        let mut user = user;
        user.groups.insert(AUTHENTICATED_GROUP.to_owned());
        Self { user, method }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.user.name
    }

    #[must_use]
    pub fn groups(&self) -> &BTreeSet<String> {
        &self.user.groups
    }

    #[must_use]
    pub fn extra(&self) -> &BTreeMap<String, Vec<String>> {
        &self.user.extra
    }

    #[must_use]
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    #[must_use]
    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.method == AuthMethod::Anonymous
    }

    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.user.groups.contains(group)
    }
}

pub struct PrincipalBuilder {
    method: AuthMethod,
    user: UserInfo,
}

impl PrincipalBuilder {
    fn new(method: AuthMethod) -> Self {
        Self {
            method,
            user: UserInfo::default(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.user.name = name.into();
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.user.groups.insert(group.into());
        self
    }

    #[must_use]
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.user.extra.insert(key.into(), values);
        self
    }

    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            user: self.user,
            method: self.method,
        }
    }
}
