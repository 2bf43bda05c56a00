#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Access Review Plugin
//!
//! Stands in for the remote subject access review authority during
//! development and testing.
//!
//! ## Modes
//!
//! - **`allow_all`** (default): Every review is allowed.
//! - **`deny_all`**: Every review is denied with the configured reason.
//! - **`rules`**: The first rule matching the subject, verb, resource and
//!   subresource decides. `*` matches anything. No match is a denial.
//!
//! ## Configuration
//!
//! ```yaml
//! access_review:
//!   mode: rules
//!   rules:
//!     - groups: ["ops"]
//!       verbs: ["get"]
//!       resources: ["nodes"]
//!       subresources: ["stats", "metrics"]
//!     - users: ["*"]
//!       effect: deny
//!       reason: "denied by policy"
//! ```

pub mod config;
pub mod domain;

pub use config::{AccessRule, AccessReviewMode, RuleEffect, StaticAccessReviewConfig};
pub use domain::Service as StaticAccessReviewer;
