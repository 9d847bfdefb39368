use crate::cnpj::Cnpj;
use crate::config::Config;
use crate::docs::{serve_openapi_spec, serve_swagger_ui};
use crate::errors::AppError;
use crate::models::{CanonicalRecord, CnpjQuery};
use crate::resolver::{MultiSourceResolver, SingleSourceResolver};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Resolver behind `/api/cnpj`.
    pub single: SingleSourceResolver,
    /// Resolver behind `/api/cnpj-multi`.
    pub multi: MultiSourceResolver,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            single: SingleSourceResolver::from_config(&config)?,
            multi: MultiSourceResolver::from_config(&config)?,
            config,
        })
    }
}

/// Builds the HTTP router with tracing and CORS layers applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
        // Lookup endpoints
        .route("/api/cnpj", get(lookup_single))
        .route("/api/cnpj-multi", get(lookup_multi))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // The lookup UI is served from another origin.
                .layer(CorsLayer::permissive()),
        )
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/cnpj?cnpj=
///
/// Looks the CNPJ up on the single configured upstream.
///
/// # Returns
///
/// * `Result<Json<CanonicalRecord>, AppError>` - The canonical record (no `_api_info`) or
///   a 400/404/429/500 error payload.
pub async fn lookup_single(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CnpjQuery>,
) -> Result<Json<CanonicalRecord>, AppError> {
    let cnpj = Cnpj::from_query(params.cnpj.as_deref())?;
    tracing::info!("GET /api/cnpj - cnpj: {}", cnpj);

    let record = state.single.resolve_cnpj(&cnpj).await?;
    Ok(Json(record))
}

/// GET /api/cnpj-multi?cnpj=
///
/// Looks the CNPJ up across every configured upstream in priority order.
///
/// # Returns
///
/// * `Result<Json<CanonicalRecord>, AppError>` - The canonical record with `_api_info`, a 400
///   for bad input, or a 500 listing the sources tried.
pub async fn lookup_multi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CnpjQuery>,
) -> Result<Json<CanonicalRecord>, AppError> {
    let cnpj = Cnpj::from_query(params.cnpj.as_deref())?;
    tracing::info!("GET /api/cnpj-multi - cnpj: {}", cnpj);

    let record = state.multi.resolve_cnpj(&cnpj).await?;

    if let Some(ref info) = record.api_info {
        tracing::info!("Resolved {} via {}", cnpj, info.fonte);
    }

    Ok(Json(record))
}
