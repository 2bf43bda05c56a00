#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod constants;
pub mod principal;

pub use principal::{AuthMethod, Principal, PrincipalBuilder, UserInfo};
