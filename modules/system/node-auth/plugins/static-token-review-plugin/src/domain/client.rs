//! Client implementation for the static token review plugin.
//!
//! Implements `TokenReviewClient` using the domain service.

use async_trait::async_trait;
use node_auth_sdk::{ReviewError, TokenReview, TokenReviewClient};

use super::service::Service;

#[async_trait]
impl TokenReviewClient for Service {
    async fn review_token(&self, bearer_token: &str) -> Result<TokenReview, ReviewError> {
        Ok(self.review(bearer_token))
    }
}
