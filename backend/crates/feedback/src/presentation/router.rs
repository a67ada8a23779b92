//! Feedback Router

use crate::application::config::FeedbackConfig;
use crate::domain::repository::{FeedbackRepository, SessionRepository};
use crate::domain::value_objects::Category;
use crate::infra::backend::{SessionBackend, StorageBackend};
use crate::infra::kv::KvStore;
use crate::presentation::handlers::{self, FeedbackAppState};
use crate::presentation::middleware::{RateLimitState, rate_limit};
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use platform::llm::LlmGateway;
use platform::rate_limit::RateLimiter;
use std::sync::Arc;

/// Create the feedback router over the startup-selected backends
pub fn feedback_router<G>(
    storage: StorageBackend,
    sessions: SessionBackend,
    gateway: G,
    limiter: Arc<RateLimiter>,
    config: FeedbackConfig,
) -> Router
where
    G: LlmGateway + Send + Sync + 'static,
{
    let feedback_repo = KvStore::new(storage, config.session_ttl);
    let state = FeedbackAppState::new(feedback_repo, sessions, gateway, config);
    feedback_router_generic(state, limiter)
}

/// Create a generic feedback router for any repository implementation
pub fn feedback_router_generic<F, S, G>(
    state: FeedbackAppState<F, S, G>,
    limiter: Arc<RateLimiter>,
) -> Router
where
    F: FeedbackRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    G: LlmGateway + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            post(handlers::submit::<F, S, G>).layer(from_fn_with_state(
                RateLimitState::new(limiter.clone(), Category::Submit),
                rate_limit,
            )),
        )
        .route(
            "/sanitize",
            post(handlers::sanitize::<F, S, G>).layer(from_fn_with_state(
                RateLimitState::new(limiter.clone(), Category::Sanitize),
                rate_limit,
            )),
        )
        .route(
            "/analyze-quality",
            post(handlers::analyze_quality::<F, S, G>).layer(from_fn_with_state(
                RateLimitState::new(limiter.clone(), Category::Analyze),
                rate_limit,
            )),
        )
        .route("/{id}", get(handlers::get_metadata::<F, S, G>))
        .route(
            "/{id}/transform",
            post(handlers::transform::<F, S, G>).layer(from_fn_with_state(
                RateLimitState::new(limiter.clone(), Category::Transform),
                rate_limit,
            )),
        )
        .with_state(state)
}
