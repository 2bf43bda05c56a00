#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Token Review Plugin
//!
//! Stands in for the remote token review authority during development and testing.
//!
//! ## Modes
//!
//! - **`accept_all`** (default): Accepts any non-empty token, returns the configured default identity.
//!
//! - **`static_tokens`**: Maps specific tokens to specific identities. Unknown tokens are
//!   reported as not authenticated.
//!
//! ## Configuration
//!
//! ```yaml
//! token_review:
//!   mode: static_tokens
//!   default_identity:
//!     name: "dev-user"
//!     groups: ["system:masters"]
//!   tokens:
//!     - token: "token-ops"
//!       identity:
//!         name: "ops"
//!         groups: ["ops"]
//! ```

pub mod config;
pub mod domain;

pub use config::{IdentityConfig, StaticTokenReviewConfig, TokenMapping, TokenReviewMode};
pub use domain::Service as StaticTokenReviewer;
