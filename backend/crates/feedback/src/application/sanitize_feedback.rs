//! Sanitize Feedback Use Case

use crate::application::config::FeedbackConfig;
use crate::application::prompts::SANITIZE_SYSTEM_PROMPT;
use crate::domain::entities::Turn;
use crate::domain::services::{TextRejection, check_text};
use crate::error::{FeedbackError, FeedbackResult};
use platform::llm::LlmGateway;
use std::sync::Arc;

/// Reject a draft that is blank or too long for the model
pub(crate) fn validate_draft(text: &str, max_chars: usize) -> FeedbackResult<()> {
    check_text(text, max_chars).map_err(|rejection| match rejection {
        TextRejection::Blank => FeedbackError::validation("Feedback is required"),
        TextRejection::TooLong { max_chars } => {
            FeedbackError::validation(format!("Feedback is too long (max {max_chars} characters)"))
        }
    })
}

/// Sanitize Feedback Use Case
pub struct SanitizeFeedbackUseCase<G>
where
    G: LlmGateway,
{
    gateway: Arc<G>,
    config: Arc<FeedbackConfig>,
}

impl<G> SanitizeFeedbackUseCase<G>
where
    G: LlmGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<FeedbackConfig>) -> Self {
        Self { gateway, config }
    }

    pub async fn execute(&self, feedback: &str) -> FeedbackResult<String> {
        validate_draft(feedback, self.config.max_draft_chars)?;

        let sanitized = self
            .gateway
            .complete(
                SANITIZE_SYSTEM_PROMPT,
                &[Turn::user(feedback)],
                self.config.sanitize_max_tokens,
            )
            .await?;

        tracing::info!(
            input_chars = feedback.chars().count(),
            output_chars = sanitized.chars().count(),
            "Sanitized feedback draft"
        );
        Ok(sanitized.trim().to_string())
    }
}
