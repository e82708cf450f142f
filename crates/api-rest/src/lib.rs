//! # API REST
//!
//! REST API for the clinical scribe.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response bodies and `scribe-core` for everything else.

#![warn(rust_2018_idioms)]

mod handlers;
mod mapping;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    ConsultEntryRes, ConsultMessageRes, DraftReq, DraftRes, DvtRiskRes, ErrorRes, HealthRes,
    NoteRes, PatientDataReq, RootRes, SectionRes, SectionsReq, SectionsRes,
};
use scribe_core::{DraftService, GenerationService, ScribeConfig};

/// Shared state for every request handler.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ScribeConfig>,
    /// `None` when no generation service is configured; `/draft/` then answers 503.
    drafts: Option<DraftService>,
}

impl AppState {
    pub fn new(cfg: Arc<ScribeConfig>, generator: Option<Arc<dyn GenerationService>>) -> Self {
        let drafts = generator.map(|g| DraftService::new(cfg.clone(), g));
        Self { cfg, drafts }
    }

    pub fn has_generator(&self) -> bool {
        self.drafts.is_some()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root,
        handlers::health,
        handlers::generate_note,
        handlers::dvt_risk,
        handlers::consult_message,
        handlers::sections,
        handlers::draft,
    ),
    components(schemas(
        RootRes,
        HealthRes,
        ErrorRes,
        PatientDataReq,
        NoteRes,
        DvtRiskRes,
        ConsultMessageRes,
        SectionRes,
        ConsultEntryRes,
        SectionsReq,
        SectionsRes,
        DraftReq,
        DraftRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/generate-note/", post(handlers::generate_note))
        .route("/dvt-risk/", post(handlers::dvt_risk))
        .route("/consult-message/", post(handlers::consult_message))
        .route("/sections/", post(handlers::sections))
        .route("/draft/", post(handlers::draft))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the REST API until the server stops.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- REST API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
