//! Rate limiting middleware
//!
//! One layer per route, each bound to its rate limit category.

use crate::domain::value_objects::Category;
use crate::error::FeedbackError;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::resolve_client_id;
use platform::rate_limit::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Middleware state
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<RateLimiter>,
    pub category: Category,
}

impl RateLimitState {
    pub fn new(limiter: Arc<RateLimiter>, category: Category) -> Self {
        Self { limiter, category }
    }
}

/// Admit or reject the request under the state's category
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client_id = resolve_client_id(req.headers(), direct_ip);

    let decision = state.limiter.check(&client_id, state.category.as_str());
    let remaining = HeaderValue::from(decision.remaining);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(
            client_id = %client_id,
            category = %state.category,
            "Rate limit denied request"
        );
        FeedbackError::RateLimited {
            retry_after_secs: decision.retry_after_secs.unwrap_or(1),
        }
        .into_response()
    };
    response
        .headers_mut()
        .insert(RATE_LIMIT_REMAINING_HEADER, remaining);
    response
}
