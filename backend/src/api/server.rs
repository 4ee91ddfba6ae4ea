//! HTTP trigger for report runs.
//!
//! # API Endpoints
//!
//! | Method | Path                       | Description                    |
//! |--------|----------------------------|--------------------------------|
//! | GET    | `/health`                  | Health check                   |
//! | POST   | `/api/reports/generate`    | Run a report (query params)    |
//! | GET    | `/api/reports/describe`    | API description                |
//! | GET    | `/api/logs`                | SSE stream of run logs         |

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::logs::LOG_BROADCASTER;
use super::types::{generate_error, ApiDescription, HealthResponse, GENERATE_OK};
use crate::config::RuleSet;
use crate::error::{ServerError, ServerResult};
use crate::transform::pipeline::{generate_report_async, ReportRequest};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub rules: Arc<RuleSet>,
    pub output_path: PathBuf,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/reports/generate", post(generate))
        .route("/api/reports/describe", get(describe))
        .route("/api/logs", get(sse_logs))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl+C / SIGTERM
pub async fn start_server(addr: &str, state: AppState) -> ServerResult<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|_| ServerError::Address(addr.to_string()))?;

    info!("🚀 Report generator listening on http://{}", addr);
    info!("   POST /api/reports/generate - Run a report");
    info!("   GET  /api/reports/describe - API description");
    info!("   GET  /api/logs             - SSE log stream");
    info!("   GET  /health               - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "reportgen".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rules: state.rules.len(),
    })
}

async fn describe() -> Json<ApiDescription> {
    Json(ApiDescription::current())
}

/// Run a report with the four query parameters
async fn generate(
    State(state): State<AppState>,
    Query(request): Query<ReportRequest>,
) -> (StatusCode, String) {
    match generate_report_async(request, state.rules.clone(), state.output_path.clone()).await {
        Ok(summary) => {
            info!(run_id = %summary.run_id, rows = summary.output_rows, "Report generated on demand");
            (StatusCode::OK, GENERATE_OK.to_string())
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, generate_error(&e)),
    }
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
