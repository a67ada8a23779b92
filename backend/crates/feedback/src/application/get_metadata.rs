//! Get Feedback Metadata Use Case

use crate::domain::entities::FeedbackMetadata;
use crate::domain::repository::FeedbackRepository;
use crate::error::{FeedbackError, FeedbackResult};
use kernel::id::FeedbackId;
use std::sync::Arc;

/// Get Feedback Metadata Use Case
pub struct GetMetadataUseCase<F>
where
    F: FeedbackRepository,
{
    feedback_repo: Arc<F>,
}

impl<F> GetMetadataUseCase<F>
where
    F: FeedbackRepository,
{
    pub fn new(feedback_repo: Arc<F>) -> Self {
        Self { feedback_repo }
    }

    /// Malformed, unknown and expired ids are all reported as NotFound
    pub async fn execute(&self, raw_id: &str) -> FeedbackResult<FeedbackMetadata> {
        let id = FeedbackId::parse_str(raw_id).map_err(|_| FeedbackError::NotFound)?;
        self.feedback_repo
            .get_metadata(&id)
            .await?
            .ok_or(FeedbackError::NotFound)
    }
}
