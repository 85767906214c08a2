//! HTTP surface of the signatures proxy.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Plain-text status message |
//! | `GET` | `/signatures` | Pivoted signatures as a JSON array |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::db::SignatureStore;
use crate::error::{ProxyError, Result};
use crate::pivot::PivotQuery;

/// Body of `GET /`.
pub const STATUS_MESSAGE: &str = "Proxy API is running. Access /signatures for data.";

/// Message returned in place of error details when redaction is on.
const REDACTED_MESSAGE: &str = "An internal error occurred. See server logs for details.";

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SignatureStore>,
    pub query: Arc<PivotQuery>,
    pub redact_errors: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn SignatureStore>, query: PivotQuery) -> Self {
        Self {
            store,
            query: Arc::new(query),
            redact_errors: false,
        }
    }

    pub fn with_redacted_errors(mut self, redact: bool) -> Self {
        self.redact_errors = redact;
        self
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error_type: String,
    error_message: String,
}

/// Creates the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/signatures", get(fetch_signatures))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the process exits.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ProxyError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Starting server on port {}", config.port);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| ProxyError::internal(format!("Server error: {e}")))
}

/// `GET /`
async fn index() -> &'static str {
    STATUS_MESSAGE
}

/// `GET /signatures` — runs the pivot for this request only.
async fn fetch_signatures(State(state): State<AppState>) -> Response {
    match state.store.fetch_signatures(&state.query).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            error_response(&e, state.redact_errors).into_response()
        }
    }
}

fn error_response(e: &ProxyError, redact: bool) -> impl IntoResponse {
    let error_message = if redact {
        REDACTED_MESSAGE.to_string()
    } else {
        e.to_string()
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error_type: e.type_name().to_string(),
            error_message,
        }),
    )
}
