//! Domain layer for node auth.

pub mod authenticator;
pub mod authorizer;
pub mod cache;
pub mod error;
pub mod local_client;
pub mod scoper;
pub mod service;

pub use authenticator::NodeAuthenticator;
pub use authorizer::NodeAuthorizer;
pub use cache::TtlCache;
pub use error::DomainError;
pub use local_client::NodeAuthLocalClient;
pub use scoper::NodeAttributeScoper;
pub use service::{Collaborators, Service};
