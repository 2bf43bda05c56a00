//! Domain layer for the static access review plugin.

pub mod client;
pub mod service;

pub use service::Service;
