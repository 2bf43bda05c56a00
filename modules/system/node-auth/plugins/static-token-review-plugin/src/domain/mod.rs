//! Domain layer for the static token review plugin.

pub mod client;
pub mod service;

pub use service::Service;
