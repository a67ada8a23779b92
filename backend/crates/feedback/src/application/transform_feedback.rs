//! Transform Feedback Use Case
//!
//! Runs one turn of a conversation about a feedback record. The first turn
//! of a conversation is composed from the sanitized feedback; later turns
//! are the caller's request verbatim. The history is saved only after the
//! gateway succeeds, so a failed call leaves the conversation untouched.

use crate::application::config::FeedbackConfig;
use crate::application::prompts::TRANSFORM_SYSTEM_PROMPT;
use crate::application::session_locks::SessionLocks;
use crate::domain::entities::Turn;
use crate::domain::repository::{FeedbackRepository, SessionRepository};
use crate::domain::services::{TextRejection, check_text, compose_first_turn};
use crate::domain::value_objects::SessionKey;
use crate::error::{FeedbackError, FeedbackResult};
use kernel::id::FeedbackId;
use platform::llm::LlmGateway;
use std::sync::Arc;

/// Input DTO for transform feedback
#[derive(Debug, Clone)]
pub struct TransformFeedbackInput {
    pub feedback_id: String,
    pub format: String,
    pub conversation_id: Option<String>,
}

/// Output DTO for transform feedback
#[derive(Debug, Clone)]
pub struct TransformFeedbackOutput {
    pub response: String,
    pub session_key: SessionKey,
    /// Turns stored after this call
    pub turns: usize,
}

/// Transform Feedback Use Case
pub struct TransformFeedbackUseCase<F, S, G>
where
    F: FeedbackRepository,
    S: SessionRepository,
    G: LlmGateway,
{
    feedback_repo: Arc<F>,
    session_repo: Arc<S>,
    gateway: Arc<G>,
    locks: Arc<SessionLocks>,
    config: Arc<FeedbackConfig>,
}

impl<F, S, G> TransformFeedbackUseCase<F, S, G>
where
    F: FeedbackRepository,
    S: SessionRepository,
    G: LlmGateway,
{
    pub fn new(
        feedback_repo: Arc<F>,
        session_repo: Arc<S>,
        gateway: Arc<G>,
        locks: Arc<SessionLocks>,
        config: Arc<FeedbackConfig>,
    ) -> Self {
        Self {
            feedback_repo,
            session_repo,
            gateway,
            locks,
            config,
        }
    }

    fn validate_format(&self, format: &str) -> FeedbackResult<()> {
        check_text(format, self.config.max_format_chars).map_err(|rejection| match rejection {
            TextRejection::Blank => FeedbackError::validation("Format request is required"),
            TextRejection::TooLong { max_chars } => FeedbackError::validation(format!(
                "Format request must be at most {max_chars} characters"
            )),
        })
    }

    fn resolve_key(
        feedback_id: FeedbackId,
        conversation_id: Option<&str>,
    ) -> FeedbackResult<SessionKey> {
        match conversation_id.filter(|raw| !raw.is_empty()) {
            None => Ok(SessionKey::new(feedback_id)),
            Some(raw) => SessionKey::parse_for(&feedback_id, raw)
                .map_err(|_| FeedbackError::validation("Invalid conversation id")),
        }
    }

    pub async fn execute(
        &self,
        input: TransformFeedbackInput,
    ) -> FeedbackResult<TransformFeedbackOutput> {
        self.validate_format(&input.format)?;

        let feedback_id =
            FeedbackId::parse_str(&input.feedback_id).map_err(|_| FeedbackError::NotFound)?;
        let feedback = self
            .feedback_repo
            .get_sanitized(&feedback_id)
            .await?
            .ok_or(FeedbackError::NotFound)?;

        let session_key = Self::resolve_key(feedback_id, input.conversation_id.as_deref())?;
        let _guard = self.locks.lock(&session_key.to_string()).await;

        let mut turns = self.session_repo.load(&session_key).await?;
        let resumed = !turns.is_empty();
        let user_turn = if resumed {
            input.format
        } else {
            compose_first_turn(&feedback.text, &feedback.personalization, &input.format)
        };
        turns.push(Turn::user(user_turn));

        let response = self
            .gateway
            .complete(
                TRANSFORM_SYSTEM_PROMPT,
                &turns,
                self.config.transform_max_tokens,
            )
            .await?;

        turns.push(Turn::assistant(response.clone()));
        self.session_repo.save(&session_key, &turns).await?;

        tracing::info!(
            feedback_id = %feedback_id,
            session_key = %session_key,
            resumed,
            turns = turns.len(),
            "Transformed feedback"
        );

        Ok(TransformFeedbackOutput {
            response,
            session_key,
            turns: turns.len(),
        })
    }
}
