//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by the
//! feedback crate.

mod settings;

use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use feedback::{
    BlobConfig, BlobStore, FeedbackConfig, KvStore, LocalFsStore, MemorySessionStore,
    SessionBackend, StorageBackend, feedback_router,
};
use platform::llm::AnthropicGateway;
use platform::rate_limit::RateLimiter;
use settings::{SessionKind, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BLOB_TIMEOUT: Duration = Duration::from_secs(30);

fn build_storage(settings: &Settings) -> anyhow::Result<StorageBackend> {
    match &settings.blob {
        Some(blob) => Ok(StorageBackend::Blob(BlobStore::new(BlobConfig {
            api_url: blob.api_url.clone(),
            token: blob.token.clone(),
            timeout: BLOB_TIMEOUT,
        })?)),
        None => Ok(StorageBackend::Local(LocalFsStore::new(&settings.data_dir))),
    }
}

fn build_sessions(
    settings: &Settings,
    storage: &StorageBackend,
    config: &FeedbackConfig,
) -> SessionBackend {
    match settings.sessions {
        SessionKind::Memory => SessionBackend::Memory(MemorySessionStore::new(
            config.max_sessions,
            config.session_ttl,
        )),
        SessionKind::Kv => SessionBackend::Kv(KvStore::new(storage.clone(), config.session_ttl)),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
}

async fn healthz() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,feedback=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let config = FeedbackConfig::default()
        .with_feedback_ttl_days(settings.feedback_ttl_days)
        .with_session_ttl_secs(settings.session_ttl_secs)
        .with_max_sessions(settings.max_sessions);

    let storage = build_storage(&settings)?;
    let sessions = build_sessions(&settings, &storage, &config);
    tracing::info!(
        storage = storage.name(),
        sessions = sessions.name(),
        max_sessions = config.max_sessions,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Selected backends"
    );

    let gateway = AnthropicGateway::new(settings.llm.clone())?;
    let limiter = Arc::new(RateLimiter::default());

    // Build router
    let app = Router::new()
        .route("/healthz", get(healthz))
        .nest(
            "/api/feedback",
            feedback_router(storage, sessions, gateway, limiter, config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.frontend_origins));

    // Start server
    tracing::info!("Listening on {}", settings.bind_addr);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz() {
        let app: Router = Router::new().route("/healthz", get(healthz));
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Construction must not panic on unparsable entries
        let _ = cors_layer(&["http://ok.test".to_string(), "\u{7f}bad".to_string()]);
    }
}
