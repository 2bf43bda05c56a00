#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Node API gateway.
//!
//! Puts every node API route behind the node auth pipeline. Routes listed
//! as public bypass it; all others are authenticated and authorized before
//! the handler runs, and the resolved [`node_security::Principal`] is made
//! available to handlers as a request extension.

pub mod auth;
pub mod config;
pub mod problem;

pub use auth::{AuthState, PublicRouteMatcher, node_auth_middleware, protect};
pub use config::NodeGatewayConfig;
pub use problem::Problem;
