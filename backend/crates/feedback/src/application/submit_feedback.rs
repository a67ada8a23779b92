//! Submit Feedback Use Case

use crate::application::config::FeedbackConfig;
use crate::domain::entities::{FeedbackRecord, Personalization};
use crate::domain::repository::FeedbackRepository;
use crate::domain::services::{TextRejection, check_text};
use crate::error::{FeedbackError, FeedbackResult};
use kernel::id::FeedbackId;
use std::sync::Arc;

/// Input DTO for submit feedback
#[derive(Debug, Clone)]
pub struct SubmitFeedbackInput {
    pub raw_feedback: String,
    pub sanitized_feedback: String,
    pub personalization: Personalization,
}

/// Output DTO for submit feedback
#[derive(Debug, Clone)]
pub struct SubmitFeedbackOutput {
    pub id: FeedbackId,
    pub expires_at_ms: i64,
}

/// Submit Feedback Use Case
pub struct SubmitFeedbackUseCase<F>
where
    F: FeedbackRepository,
{
    feedback_repo: Arc<F>,
    config: Arc<FeedbackConfig>,
}

impl<F> SubmitFeedbackUseCase<F>
where
    F: FeedbackRepository,
{
    pub fn new(feedback_repo: Arc<F>, config: Arc<FeedbackConfig>) -> Self {
        Self {
            feedback_repo,
            config,
        }
    }

    fn validate(&self, input: &SubmitFeedbackInput) -> FeedbackResult<()> {
        for text in [&input.raw_feedback, &input.sanitized_feedback] {
            match check_text(text, self.config.max_stored_chars) {
                Ok(()) => {}
                Err(TextRejection::Blank) => {
                    return Err(FeedbackError::validation(
                        "Both raw and sanitized feedback are required",
                    ));
                }
                Err(TextRejection::TooLong { .. }) => {
                    return Err(FeedbackError::validation("Feedback exceeds maximum length"));
                }
            }
        }

        let p = &input.personalization;
        let too_long = [&p.sender_name, &p.recipient_name, &p.relationship]
            .into_iter()
            .flatten()
            .any(|field| field.chars().count() > self.config.max_name_chars);
        if too_long {
            return Err(FeedbackError::validation(format!(
                "Names and relationship must be at most {} characters",
                self.config.max_name_chars
            )));
        }
        Ok(())
    }

    pub async fn execute(&self, input: SubmitFeedbackInput) -> FeedbackResult<SubmitFeedbackOutput> {
        let input = SubmitFeedbackInput {
            personalization: input.personalization.normalized(),
            ..input
        };
        self.validate(&input)?;

        let record = FeedbackRecord::new(
            input.raw_feedback,
            input.sanitized_feedback,
            input.personalization,
            self.config.feedback_ttl,
        );
        self.feedback_repo.put(&record).await?;

        tracing::info!(
            feedback_id = %record.id,
            personalized = !record.personalization.is_empty(),
            "Stored feedback"
        );

        Ok(SubmitFeedbackOutput {
            id: record.id,
            expires_at_ms: record.expires_at_ms,
        })
    }
}
