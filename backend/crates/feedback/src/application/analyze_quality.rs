//! Analyze Feedback Quality Use Case
//!
//! Never fails on the model side: a gateway error or an unparseable reply
//! degrades to [`QualityAnalysis::neutral`].

use crate::application::config::FeedbackConfig;
use crate::application::prompts::ANALYZE_QUALITY_SYSTEM_PROMPT;
use crate::application::sanitize_feedback::validate_draft;
use crate::domain::entities::{QualityAnalysis, Turn};
use crate::domain::services::{has_core_elements, parse_quality_analysis};
use crate::error::FeedbackResult;
use platform::llm::LlmGateway;
use std::sync::Arc;

/// Analyze Feedback Quality Use Case
pub struct AnalyzeQualityUseCase<G>
where
    G: LlmGateway,
{
    gateway: Arc<G>,
    config: Arc<FeedbackConfig>,
}

impl<G> AnalyzeQualityUseCase<G>
where
    G: LlmGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<FeedbackConfig>) -> Self {
        Self { gateway, config }
    }

    pub async fn execute(&self, feedback: &str) -> FeedbackResult<QualityAnalysis> {
        validate_draft(feedback, self.config.max_draft_chars)?;

        let reply = self
            .gateway
            .complete(
                ANALYZE_QUALITY_SYSTEM_PROMPT,
                &[Turn::user(feedback)],
                self.config.analyze_max_tokens,
            )
            .await;

        let analysis = match reply {
            Ok(text) => parse_quality_analysis(&text).unwrap_or_else(|| {
                tracing::warn!("Unparseable quality analysis, using neutral result");
                QualityAnalysis::neutral()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Quality analysis unavailable, using neutral result");
                QualityAnalysis::neutral()
            }
        };

        tracing::debug!(
            score = analysis.overall_score,
            core_elements = has_core_elements(&analysis.elements),
            "Analyzed feedback quality"
        );
        Ok(analysis)
    }
}
