//! Node Auth Module
//!
//! Decides whether an inbound node API request may proceed:
//! authenticate (anonymous, client certificate, or delegated token review),
//! scope the requested action to this node, then authorize it (always-allow
//! or delegated subject access review with separate allow/deny cache TTLs).
//!
//! Provides the `NodeAuthClient` trait implementation consumed by the gateway.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use domain::Collaborators;
pub use module::init;
