//! Client implementation for the static access review plugin.
//!
//! Implements `SubjectAccessReviewClient` using the domain service.

use async_trait::async_trait;
use node_auth_sdk::{
    ReviewError, SubjectAccessReview, SubjectAccessReviewClient, SubjectAccessReviewStatus,
};

use super::service::Service;

#[async_trait]
impl SubjectAccessReviewClient for Service {
    async fn review_access(
        &self,
        review: &SubjectAccessReview,
    ) -> Result<SubjectAccessReviewStatus, ReviewError> {
        Ok(self.evaluate(review))
    }
}
