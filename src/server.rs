//! HTTP entry point
//!
//! Serves the transfer and health endpoints, plus the static web client from
//! the configured directory. Anything else gets a JSON 404.

use crate::api::{self, TransferBody, TransferReply, TransferRequest};
use crate::engine::Engine;
use crate::models::Config;
use crate::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

impl IntoResponse for TransferReply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            TransferBody::Success(body) => (status, Json(body)).into_response(),
            TransferBody::Failure(body) => (status, Json(body)).into_response(),
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86_400))
}

pub fn router(engine: Engine, config: &Config) -> Router {
    // Unknown paths and unsupported methods both end in the JSON 404.
    let static_files = ServeDir::new(&config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/api/transfer-outfit", post(transfer_outfit))
        .route("/api/health", get(health))
        .method_not_allowed_fallback(not_found)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(engine))
}

async fn transfer_outfit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TransferRequest>, JsonRejection>,
) -> TransferReply {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("transfer_outfit", %request_id);

    match payload {
        Ok(Json(input)) => {
            api::handle_transfer(&state.engine, input)
                .instrument(span)
                .await
        }
        Err(rejection) => {
            warn!(%request_id, "Unreadable request body: {}", rejection.body_text());
            api::invalid_json(rejection.body_text())
        }
    }
}

async fn health() -> Json<api::HealthBody> {
    Json(api::health())
}

async fn not_found() -> TransferReply {
    api::not_found()
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let engine = Engine::from_config(&config)?;
    let models: Vec<&str> = engine.candidates().iter().map(|c| c.model()).collect();
    info!("Model fallback chain: {}", models.join(" -> "));

    let app = router(engine, &config);
    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Outfit transfer server listening on http://{}", addr);
    info!("Serving static files from {}", config.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
