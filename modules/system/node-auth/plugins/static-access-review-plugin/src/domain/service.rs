//! Service implementation for the static access review plugin.

use node_auth_sdk::{SubjectAccessReview, SubjectAccessReviewStatus};

use crate::config::{AccessReviewMode, AccessRule, RuleEffect, StaticAccessReviewConfig, WILDCARD};

pub const NO_MATCHING_RULE: &str = "no matching rule";

/// Static access review service.
pub struct Service {
    mode: AccessReviewMode,
    deny_reason: String,
    rules: Vec<AccessRule>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticAccessReviewConfig) -> Self {
        tracing::info!(mode = ?cfg.mode, rules = cfg.rules.len(), "Static access reviewer configured");
        Self {
            mode: cfg.mode,
            deny_reason: cfg.deny_reason.clone(),
            rules: cfg.rules.clone(),
        }
    }

    /// Evaluate a subject access review.
    #[must_use]
    pub fn evaluate(&self, review: &SubjectAccessReview) -> SubjectAccessReviewStatus {
        match self.mode {
            AccessReviewMode::AllowAll => allow("allow all"),
            AccessReviewMode::DenyAll => deny(&self.deny_reason),
            AccessReviewMode::Rules => self
                .rules
                .iter()
                .enumerate()
                .find(|(_, rule)| rule_matches(rule, review))
                .map_or_else(|| deny(NO_MATCHING_RULE), |(idx, rule)| decide(rule, idx)),
        }
    }
}

fn decide(rule: &AccessRule, idx: usize) -> SubjectAccessReviewStatus {
    match (rule.effect, rule.reason.as_deref()) {
        (RuleEffect::Allow, Some(reason)) => allow(reason),
        (RuleEffect::Allow, None) => allow(&format!("allowed by rule {idx}")),
        (RuleEffect::Deny, Some(reason)) => deny(reason),
        (RuleEffect::Deny, None) => deny(&format!("denied by rule {idx}")),
    }
}

fn rule_matches(rule: &AccessRule, review: &SubjectAccessReview) -> bool {
    let attrs = &review.resource_attributes;
    let subject = matches_any(&rule.users, &review.user)
        || review.groups.iter().any(|g| matches_any(&rule.groups, g));

    subject
        && matches_any(&rule.verbs, &attrs.verb)
        && matches_any(&rule.resources, &attrs.resource)
        && match attrs.subresource.as_deref() {
            Some(sub) => matches_any(&rule.subresources, sub),
            None => rule.subresources.iter().any(|p| p == WILDCARD || p.is_empty()),
        }
}

fn matches_any(patterns: &[String], value: &str) -> bool {
    patterns.iter().any(|p| p == WILDCARD || p == value)
}

fn allow(reason: &str) -> SubjectAccessReviewStatus {
    SubjectAccessReviewStatus {
        allowed: true,
        denied: false,
        reason: reason.to_owned(),
    }
}

fn deny(reason: &str) -> SubjectAccessReviewStatus {
    SubjectAccessReviewStatus {
        allowed: false,
        denied: true,
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use node_auth_sdk::ResourceAttributes;

    use super::*;

    fn review(user: &str, groups: &[&str], verb: &str, subresource: Option<&str>) -> SubjectAccessReview {
        SubjectAccessReview {
            user: user.to_owned(),
            groups: groups.iter().map(|g| (*g).to_owned()).collect::<BTreeSet<_>>(),
            extra: BTreeMap::new(),
            resource_attributes: ResourceAttributes {
                namespace: None,
                verb: verb.to_owned(),
                resource: "nodes".to_owned(),
                subresource: subresource.map(str::to_owned),
                name: Some("node-1".to_owned()),
                path: None,
            },
        }
    }

    fn rules(rules: Vec<AccessRule>) -> Service {
        Service::from_config(&StaticAccessReviewConfig {
            mode: AccessReviewMode::Rules,
            rules,
            ..StaticAccessReviewConfig::default()
        })
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn allow_all_allows() {
        let service = Service::from_config(&StaticAccessReviewConfig::default());
        let status = service.evaluate(&review("alice", &[], "delete", None));
        assert!(status.allowed);
        assert!(!status.denied);
    }

    #[test]
    fn deny_all_uses_configured_reason() {
        let service = Service::from_config(&StaticAccessReviewConfig {
            mode: AccessReviewMode::DenyAll,
            deny_reason: "maintenance".to_owned(),
            rules: Vec::new(),
        });
        let status = service.evaluate(&review("alice", &[], "get", None));
        assert!(!status.allowed);
        assert_eq!(status.reason, "maintenance");
    }

    #[test]
    fn first_matching_rule_wins() {
        let service = rules(vec![
            AccessRule {
                users: strings(&["alice"]),
                verbs: strings(&["delete"]),
                effect: RuleEffect::Deny,
                reason: Some("no deletes".to_owned()),
                ..AccessRule::default()
            },
            AccessRule {
                users: strings(&["alice"]),
                ..AccessRule::default()
            },
        ]);

        let delete = service.evaluate(&review("alice", &[], "delete", None));
        assert!(!delete.allowed);
        assert_eq!(delete.reason, "no deletes");

        let get = service.evaluate(&review("alice", &[], "get", None));
        assert!(get.allowed);
        assert_eq!(get.reason, "allowed by rule 1");
    }

    #[test]
    fn group_membership_matches_subject() {
        let service = rules(vec![AccessRule {
            groups: strings(&["ops"]),
            subresources: strings(&["stats", "metrics"]),
            ..AccessRule::default()
        }]);

        assert!(service.evaluate(&review("bob", &["ops"], "get", Some("stats"))).allowed);
        assert!(!service.evaluate(&review("bob", &["ops"], "get", Some("log"))).allowed);
        assert!(!service.evaluate(&review("bob", &["dev"], "get", Some("stats"))).allowed);
    }

    #[test]
    fn no_match_is_denied_with_reason() {
        let service = rules(vec![AccessRule {
            users: strings(&["alice"]),
            ..AccessRule::default()
        }]);

        let status = service.evaluate(&review("mallory", &[], "get", None));
        assert!(!status.allowed);
        assert!(status.denied);
        assert_eq!(status.reason, NO_MATCHING_RULE);
    }

    #[test]
    fn named_subresources_do_not_match_missing_subresource() {
        let service = rules(vec![AccessRule {
            users: strings(&[WILDCARD]),
            subresources: strings(&["proxy"]),
            ..AccessRule::default()
        }]);

        assert!(!service.evaluate(&review("alice", &[], "get", None)).allowed);
        assert!(service.evaluate(&review("alice", &[], "get", Some("proxy"))).allowed);
    }

    #[test]
    fn default_reason_names_the_matching_rule_index() {
        let service = rules(vec![
            AccessRule {
                users: strings(&["bob"]),
                ..AccessRule::default()
            },
            AccessRule {
                users: strings(&["carol"]),
                ..AccessRule::default()
            },
            AccessRule {
                users: strings(&["alice"]),
                effect: RuleEffect::Deny,
                ..AccessRule::default()
            },
        ]);

        let carol = service.evaluate(&review("carol", &[], "get", None));
        assert_eq!(carol.reason, "allowed by rule 1");

        let alice = service.evaluate(&review("alice", &[], "get", None));
        assert!(!alice.allowed);
        assert_eq!(alice.reason, "denied by rule 2");
    }
}
