//! HTTP Handlers

use crate::application::analyze_quality::AnalyzeQualityUseCase;
use crate::application::config::FeedbackConfig;
use crate::application::get_metadata::GetMetadataUseCase;
use crate::application::sanitize_feedback::SanitizeFeedbackUseCase;
use crate::application::session_locks::SessionLocks;
use crate::application::submit_feedback::{SubmitFeedbackInput, SubmitFeedbackUseCase};
use crate::application::transform_feedback::{TransformFeedbackInput, TransformFeedbackUseCase};
use crate::domain::entities::{Personalization, QualityAnalysis};
use crate::domain::repository::{FeedbackRepository, SessionRepository};
use crate::error::{FeedbackError, FeedbackResult};
use crate::presentation::dto::{
    DraftRequest, MetadataResponse, SanitizeResponse, SubmitRequest, SubmitResponse,
    TransformRequest, TransformResponse,
};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use platform::llm::LlmGateway;
use std::sync::Arc;

/// Shared state for feedback handlers
pub struct FeedbackAppState<F, S, G> {
    pub feedback_repo: Arc<F>,
    pub session_repo: Arc<S>,
    pub gateway: Arc<G>,
    pub locks: Arc<SessionLocks>,
    pub config: Arc<FeedbackConfig>,
}

impl<F, S, G> FeedbackAppState<F, S, G> {
    pub fn new(feedback_repo: F, session_repo: S, gateway: G, config: FeedbackConfig) -> Self {
        Self {
            feedback_repo: Arc::new(feedback_repo),
            session_repo: Arc::new(session_repo),
            gateway: Arc::new(gateway),
            locks: Arc::new(SessionLocks::new()),
            config: Arc::new(config),
        }
    }
}

impl<F, S, G> Clone for FeedbackAppState<F, S, G> {
    fn clone(&self) -> Self {
        Self {
            feedback_repo: self.feedback_repo.clone(),
            session_repo: self.session_repo.clone(),
            gateway: self.gateway.clone(),
            locks: self.locks.clone(),
            config: self.config.clone(),
        }
    }
}

/// Unwrap a JSON body, reporting malformed input as a validation error
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> FeedbackResult<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        FeedbackError::validation("Malformed request body")
    })
}

/// POST /api/feedback/sanitize
pub async fn sanitize<F, S, G>(
    State(state): State<FeedbackAppState<F, S, G>>,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> FeedbackResult<Json<SanitizeResponse>>
where
    F: FeedbackRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    G: LlmGateway + Send + Sync + 'static,
{
    let req = body(payload)?;
    let use_case = SanitizeFeedbackUseCase::new(state.gateway.clone(), state.config.clone());
    let sanitized = use_case.execute(&req.feedback.unwrap_or_default()).await?;
    Ok(Json(SanitizeResponse { sanitized }))
}

/// POST /api/feedback/analyze-quality
pub async fn analyze_quality<F, S, G>(
    State(state): State<FeedbackAppState<F, S, G>>,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> FeedbackResult<Json<QualityAnalysis>>
where
    F: FeedbackRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    G: LlmGateway + Send + Sync + 'static,
{
    let req = body(payload)?;
    let use_case = AnalyzeQualityUseCase::new(state.gateway.clone(), state.config.clone());
    let analysis = use_case.execute(&req.feedback.unwrap_or_default()).await?;
    Ok(Json(analysis))
}

/// POST /api/feedback
pub async fn submit<F, S, G>(
    State(state): State<FeedbackAppState<F, S, G>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> FeedbackResult<Json<SubmitResponse>>
where
    F: FeedbackRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    G: LlmGateway + Send + Sync + 'static,
{
    let req = body(payload)?;
    let use_case = SubmitFeedbackUseCase::new(state.feedback_repo.clone(), state.config.clone());

    let output = use_case
        .execute(SubmitFeedbackInput {
            raw_feedback: req.raw_feedback.unwrap_or_default(),
            sanitized_feedback: req.sanitized_feedback.unwrap_or_default(),
            personalization: Personalization::new(
                req.sender_name,
                req.recipient_name,
                req.relationship,
            ),
        })
        .await?;

    Ok(Json(SubmitResponse {
        id: output.id.to_string(),
    }))
}

/// GET /api/feedback/{id}
pub async fn get_metadata<F, S, G>(
    State(state): State<FeedbackAppState<F, S, G>>,
    Path(id): Path<String>,
) -> FeedbackResult<Json<MetadataResponse>>
where
    F: FeedbackRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    G: LlmGateway + Send + Sync + 'static,
{
    let use_case = GetMetadataUseCase::new(state.feedback_repo.clone());
    let metadata = use_case.execute(&id).await?;

    Ok(Json(MetadataResponse {
        exists: true,
        created_at: metadata.created_at,
        sender_name: metadata.personalization.sender_name,
        recipient_name: metadata.personalization.recipient_name,
        relationship: metadata.personalization.relationship,
    }))
}

/// POST /api/feedback/{id}/transform
pub async fn transform<F, S, G>(
    State(state): State<FeedbackAppState<F, S, G>>,
    Path(id): Path<String>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> FeedbackResult<Json<TransformResponse>>
where
    F: FeedbackRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    G: LlmGateway + Send + Sync + 'static,
{
    let req = body(payload)?;
    let use_case = TransformFeedbackUseCase::new(
        state.feedback_repo.clone(),
        state.session_repo.clone(),
        state.gateway.clone(),
        state.locks.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(TransformFeedbackInput {
            feedback_id: id,
            format: req.format.unwrap_or_default(),
            conversation_id: req.conversation_id,
        })
        .await?;

    Ok(Json(TransformResponse {
        response: output.response,
        conversation_id: output.session_key.to_string(),
    }))
}
