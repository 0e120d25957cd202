//! HTTP surface for folio.
//!
//! Routes are mounted under `/api`:
//!
//! | Method | Path                    | Purpose                          |
//! |--------|-------------------------|----------------------------------|
//! | POST   | `/api/feedback`         | submit feedback                  |
//! | GET    | `/api/feedback/summary` | per-day breakdown (`?date=`)     |
//! | GET    | `/api/feedback/all`     | every stored record              |
//! | GET    | `/api/feedback/stats`   | totals and the ten latest records|
//! | GET    | `/api/health`           | liveness                         |
//! | POST   | `/api/contact`          | contact form, logged only        |
//! | POST   | `/api/analytics`        | analytics event, logged only     |
//!
//! POST bodies may be JSON or URL-encoded form data. Responses are
//! compressed when the client accepts it and carry a fixed set of security
//! headers.

mod error;
mod extract;
mod middleware;
mod routes;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use crate::service::FeedbackService;
use crate::storage::JsonFileStore;

/// Shared application state, injected into all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Feedback operations.
    pub service: FeedbackService,
    /// Environment name reported by the health check.
    pub environment: Arc<str>,
}

impl AppState {
    /// Create state from a service and an environment name.
    #[must_use]
    pub fn new(service: FeedbackService, environment: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            environment: environment.into(),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health))
        .route("/contact", post(routes::contact))
        .route("/analytics", post(routes::analytics))
        .route("/feedback", post(routes::submit_feedback))
        .route("/feedback/summary", get(routes::feedback_summary))
        .route("/feedback/all", get(routes::all_feedback))
        .route("/feedback/stats", get(routes::feedback_stats));

    let mut router = Router::new()
        .nest("/api", api)
        .layer(axum_mw::from_fn(middleware::log_request))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes));

    for (name, value) in security_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    router
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// Headers added to every response unless a handler already set them.
fn security_headers() -> [(HeaderName, HeaderValue); 6] {
    [
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ),
        (
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
    ]
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Open the store described by `config` and serve the API until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the listener cannot be
/// bound, or the server fails while running.
pub async fn serve(config: &Config) -> Result<()> {
    let store = JsonFileStore::open(config.feedback_dir(), config.storage.daily_log)?;
    let service = FeedbackService::new(Arc::new(store));
    let state = AppState::new(service, config.server.environment.as_str());
    let app = build_router(state, &config.server);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| Error::Bind {
            address: address.clone(),
            source,
        })?;

    info!(
        "Server running on {address} (environment: {})",
        config.server.environment
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
