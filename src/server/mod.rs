//! HTTP server for Cardiomask
//!
//! Exposes the de-identification service over three routes:
//! - `GET /` - liveness greeting
//! - `GET /upload` - websocket ingest session (see [`ingest`])
//! - `GET /export.csv` - CSV snapshot of the pseudonym store
//!
//! Cross-origin access is restricted to the single configured client origin.

pub mod archive;
pub mod ingest;

use crate::config::CardiomaskConfig;
use crate::domain::{CardiomaskError, Result};
use crate::redaction::FileDispatcher;
use crate::store::{self, PseudonymStore};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    store: PseudonymStore,
    dispatcher: FileDispatcher,
}

impl AppState {
    /// Creates the server state over a shared store
    pub fn new(store: PseudonymStore) -> Self {
        let dispatcher = FileDispatcher::new(store.clone());
        Self { store, dispatcher }
    }
}

/// Builds the application router with CORS restricted to the configured
/// origin.
pub fn router(state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| CardiomaskError::Configuration(format!("invalid allowed_origin: {e}")))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/", get(root))
        .route("/upload", get(upload))
        .route("/export.csv", get(export_csv))
        .layer(cors)
        .with_state(state))
}

/// Runs the server until the shutdown signal fires.
pub async fn serve(
    config: &CardiomaskConfig,
    store: PseudonymStore,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .map_err(|e| CardiomaskError::Configuration(format!("invalid bind_address: {e}")))?;

    let app = router(AppState::new(store), &config.server.allowed_origin)?;

    tracing::info!(address = %addr, "Server listening");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await
        .map_err(|e| CardiomaskError::Io(e.to_string()))
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while shutdown.changed().await.is_ok() {
        if *shutdown.borrow() {
            tracing::info!("Shutdown signal received, stopping server");
            break;
        }
    }
}

/// Liveness greeting
async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Cardiomask de-identification service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Upgrades the connection and hands it to the ingest session
async fn upload(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| ingest::run_session(socket, dispatcher))
}

/// Streams the pseudonym table as a CSV attachment
async fn export_csv(State(state): State<AppState>) -> Response {
    let records = match state.store.export_all() {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "CSV export failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response();
        }
    };

    let filename = store::csv::snapshot_filename();
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        ),
        (
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            "Content-Disposition".to_string(),
        ),
    ];
    (headers, store::csv::to_csv(&records)).into_response()
}
