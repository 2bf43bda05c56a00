//! Configuration for the static access review plugin.

use serde::{Deserialize, Serialize};

pub const WILDCARD: &str = "*";

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAccessReviewConfig {
    /// Review mode.
    pub mode: AccessReviewMode,

    /// Reason reported in `deny_all` mode.
    pub deny_reason: String,

    /// Ordered rules for `rules` mode.
    pub rules: Vec<AccessRule>,
}

impl Default for StaticAccessReviewConfig {
    fn default() -> Self {
        Self {
            mode: AccessReviewMode::AllowAll,
            deny_reason: "denied by policy".to_owned(),
            rules: Vec::new(),
        }
    }
}

/// Review mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReviewMode {
    /// Allow every review.
    #[default]
    AllowAll,
    /// Deny every review.
    DenyAll,
    /// First matching rule decides.
    Rules,
}

/// What a matching rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleEffect {
    #[default]
    Allow,
    Deny,
}

/// One access rule.
///
/// The subject matches when its name is in `users` or one of its groups is
/// in `groups`. A subresource pattern of `*` also matches requests without a
/// subresource.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessRule {
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub verbs: Vec<String>,
    pub resources: Vec<String>,
    pub subresources: Vec<String>,
    pub effect: RuleEffect,
    /// Reported reason; defaults to a description of the effect.
    pub reason: Option<String>,
}

impl Default for AccessRule {
    fn default() -> Self {
        let any = || vec![WILDCARD.to_owned()];
        Self {
            users: Vec::new(),
            groups: Vec::new(),
            verbs: any(),
            resources: any(),
            subresources: any(),
            effect: RuleEffect::Allow,
            reason: None,
        }
    }
}
