//! Attribute scoping.
//!
//! Turns a principal plus a requested action into the attribute tuple the
//! authorizer evaluates, scoped to this node. Pure: no I/O, no caching.

use node_auth_sdk::{AuthorizationAttributes, NODES_RESOURCE, RequestedAction};
use node_security::Principal;

use super::error::DomainError;

/// Scopes requested actions to a fixed node identity.
#[derive(Debug, Clone)]
pub struct NodeAttributeScoper {
    node_name: String,
    require_node_scope: bool,
}

impl NodeAttributeScoper {
    #[must_use]
    pub fn new(node_name: impl Into<String>, require_node_scope: bool) -> Self {
        Self {
            node_name: node_name.into(),
            require_node_scope,
        }
    }

    #[must_use]
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Build the attributes for `principal` performing `action` on this node.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a missing verb or resource, or an empty node
    /// identity when node scope is required.
    pub fn scope(
        &self,
        principal: Principal,
        action: &RequestedAction,
    ) -> Result<AuthorizationAttributes, DomainError> {
        scope_attributes(principal, action, &self.node_name, self.require_node_scope)
    }
}

/// Build node-scoped authorization attributes.
///
/// Verbs are lowercased, blank optional fields become `None`, and a `nodes`
/// request that names no object is pinned to `node`.
///
/// # Errors
///
/// `InvalidInput` for a missing verb or resource, or an empty `node` when
/// `require_node_scope` is set.
pub fn scope_attributes(
    principal: Principal,
    action: &RequestedAction,
    node: &str,
    require_node_scope: bool,
) -> Result<AuthorizationAttributes, DomainError> {
    let node = node.trim();
    if require_node_scope && node.is_empty() {
        return Err(DomainError::InvalidInput(
            "node identity is required for node-scoped authorization".to_owned(),
        ));
    }

    let verb = action.verb.trim().to_ascii_lowercase();
    if verb.is_empty() {
        return Err(DomainError::InvalidInput("request has no verb".to_owned()));
    }
    let resource = action.resource.trim();
    if resource.is_empty() {
        return Err(DomainError::InvalidInput("request has no resource".to_owned()));
    }

    let mut name = non_blank(action.name.as_deref());
    if name.is_none() && resource == NODES_RESOURCE && !node.is_empty() {
        name = Some(node.to_owned());
    }

    Ok(AuthorizationAttributes {
        principal,
        verb,
        resource: resource.to_owned(),
        subresource: non_blank(action.subresource.as_deref()),
        name,
        namespace: non_blank(action.namespace.as_deref()),
        node: node.to_owned(),
        path: non_blank(action.path.as_deref()),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use node_security::AuthMethod;

    use super::*;

    fn alice() -> Principal {
        Principal::builder(AuthMethod::Webhook).name("alice").build()
    }

    #[test]
    fn scopes_nodes_request_to_node_name() {
        let scoper = NodeAttributeScoper::new("node-1", true);
        let attrs = scoper
            .scope(alice(), &RequestedAction::new("GET", "nodes").subresource("stats"))
            .unwrap();

        assert_eq!(attrs.principal.name(), "alice");
        assert_eq!(attrs.verb, "get");
        assert_eq!(attrs.resource, "nodes");
        assert_eq!(attrs.subresource.as_deref(), Some("stats"));
        assert_eq!(attrs.name.as_deref(), Some("node-1"));
        assert_eq!(attrs.node, "node-1");
        assert!(attrs.namespace.is_none());
    }

    #[test]
    fn keeps_explicit_name_and_namespace() {
        let action = RequestedAction::new("list", "pods")
            .name("web-0")
            .namespace("default");
        let attrs = scope_attributes(alice(), &action, "node-1", true).unwrap();

        assert_eq!(attrs.name.as_deref(), Some("web-0"));
        assert_eq!(attrs.namespace.as_deref(), Some("default"));
        assert_eq!(attrs.node, "node-1");
    }

    #[test]
    fn blank_optionals_become_none() {
        let action = RequestedAction::new("get", "pods").namespace("  ").name("");
        let attrs = scope_attributes(alice(), &action, "node-1", true).unwrap();

        assert!(attrs.namespace.is_none());
        assert!(attrs.name.is_none());
    }

    #[test]
    fn empty_node_rejected_when_node_scope_required() {
        let err = scope_attributes(alice(), &RequestedAction::new("get", "nodes"), " ", true)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn empty_node_allowed_without_node_scope() {
        let attrs =
            scope_attributes(alice(), &RequestedAction::new("get", "nodes"), "", false).unwrap();
        assert!(attrs.name.is_none());
        assert_eq!(attrs.node, "");
    }

    #[test]
    fn missing_verb_or_resource_rejected() {
        let no_verb = scope_attributes(alice(), &RequestedAction::new("", "nodes"), "n", true);
        let no_resource = scope_attributes(alice(), &RequestedAction::new("get", ""), "n", true);

        assert!(matches!(no_verb, Err(DomainError::InvalidInput(_))));
        assert!(matches!(no_resource, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn http_action_is_scoped_to_node_with_path() {
        let scoper = NodeAttributeScoper::new("node-1", true);
        let attrs = scoper
            .scope(alice(), &RequestedAction::from_http("GET", "/logs/syslog"))
            .unwrap();

        assert_eq!(attrs.subresource.as_deref(), Some("log"));
        assert_eq!(attrs.name.as_deref(), Some("node-1"));
        assert_eq!(attrs.path.as_deref(), Some("/logs/syslog"));
    }

    #[test]
    fn unknown_method_fails_scoping() {
        let scoper = NodeAttributeScoper::new("node-1", true);
        let res = scoper.scope(alice(), &RequestedAction::from_http("TRACE", "/pods"));
        assert!(matches!(res, Err(DomainError::InvalidInput(_))));
    }
}
