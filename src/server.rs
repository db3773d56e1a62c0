//! HTTP surface for the resolution service.
//!
//! One read endpoint plus a health probe. Handlers are thin: they parse
//! the path, call the resolver, and translate the closed error taxonomy
//! into status codes. Cross-origin access is granted to a configured
//! allow-list of front-end origins with credentials.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, error, info};

use crate::config::{ServerSettings, ServiceConfig};
use crate::error::{Error, Result};
use crate::resolver::Resolver;

/// JSON body for error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code, e.g. "E401"
    pub error: String,

    /// Human-readable detail, safe to show to the caller
    pub detail: String,
}

/// JSON body for the health probe.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub personas: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Build the application router.
pub fn router(resolver: Arc<Resolver>, settings: &ServerSettings) -> Result<Router> {
    let cors = build_cors(&settings.cors_allowed_origins)?;

    Ok(Router::new()
        .route("/api/v1/learning-style/:user_id", get(get_learning_style))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(resolver))
}

/// Build the CORS layer from the configured origin allow-list.
///
/// Credentials are allowed, so the origin set must be an explicit list
/// (a wildcard is invalid with credentials); methods and headers mirror
/// whatever the browser asks for.
fn build_cors(origins: &[String]) -> Result<CorsLayer> {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                Error::Config(format!("Invalid CORS origin '{}'", origin))
            })
        })
        .collect::<Result<_>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &ServiceConfig, resolver: Arc<Resolver>) -> Result<()> {
    let addr = config.bind_addr()?;
    let app = router(resolver, &config.server)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }
    info!("Shutdown signal received");
}

// ─────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────

/// GET /api/v1/learning-style/{user_id}
///
/// Non-integer path segments never reach this handler; the typed
/// extractor rejects them first.
async fn get_learning_style(
    State(resolver): State<Arc<Resolver>>,
    Path(user_id): Path<i64>,
) -> Response {
    match resolver.resolve(user_id) {
        Ok(persona) => (StatusCode::OK, Json(persona)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// GET /healthz
async fn healthz(State(resolver): State<Arc<Resolver>>) -> Response {
    if resolver.is_ready() {
        let body = HealthResponse {
            status: "ok".to_string(),
            users: resolver.user_count(),
            personas: Some(resolver.catalog().len()),
            reason: None,
        };
        (StatusCode::OK, Json(body)).into_response()
    } else {
        let body = HealthResponse {
            status: "degraded".to_string(),
            users: None,
            personas: Some(resolver.catalog().len()),
            reason: resolver.unavailable_reason().map(|r| r.to_string()),
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

/// Translate an error into an HTTP response.
///
/// Client faults echo their message; server faults are logged with full
/// context and answered with a generic body.
fn error_response(err: &Error) -> Response {
    let status = StatusCode::from_u16(err.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_client_fault() {
        debug!(code = %err.code(), error = %err, "Resolution refused");
    } else {
        error!(code = %err.code(), error = %err, "Request failed with server fault");
    }

    let body = ErrorBody {
        error: err.code().as_str(),
        detail: err.public_message(),
    };
    (status, Json(body)).into_response()
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
