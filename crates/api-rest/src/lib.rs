//! # API REST
//!
//! REST API implementation for SymCheck.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for wire types and `symcheck-core` for the prediction pipeline.

#![warn(rust_2018_idioms)]

use api_shared::{
    AdvisoryRes, AlternativeRes, BadExampleRes, DiagnosisRes, DoctorAdviceRes,
    EmergencyContactRes, EmergencyRes, ExamplesRes, HealthRes, HealthService, InvalidInputRes,
    ModelInfoRes, PredictKind, PredictReq, PredictRes, PresetRes, ReminderRes,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use symcheck_core::{CoreError, PredictionPipeline};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
///
/// The pipeline is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
}

impl AppState {
    pub fn new(pipeline: PredictionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, predict, examples, model_info),
    components(schemas(
        HealthRes,
        PredictReq,
        PredictRes,
        PredictKind,
        InvalidInputRes,
        EmergencyRes,
        EmergencyContactRes,
        DiagnosisRes,
        AdvisoryRes,
        DoctorAdviceRes,
        AlternativeRes,
        ReminderRes,
        ExamplesRes,
        PresetRes,
        BadExampleRes,
        ModelInfoRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/examples", get(examples))
        .route("/model", get(model_info))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_status(err: &CoreError) -> (StatusCode, &'static str) {
    match err {
        CoreError::ModelNotReady => (StatusCode::SERVICE_UNAVAILABLE, "Model not ready"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Always answers 200; `ok` is false while no model is installed.
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(state.pipeline.engine().is_ready()))
}

#[utoipa::path(
    post,
    path = "/predict",
    request_body = PredictReq,
    responses(
        (status = 200, description = "Invalid input, emergency alert or diagnosis", body = PredictRes),
        (status = 503, description = "No model loaded"),
        (status = 500, description = "Internal server error")
    )
)]
/// Run a symptom description through the prediction pipeline
///
/// Rejected input and emergencies are successful responses; inspect `kind`.
#[axum::debug_handler]
async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictReq>,
) -> Result<Json<PredictRes>, (StatusCode, &'static str)> {
    match state.pipeline.predict(&req.symptoms) {
        Ok(result) => Ok(Json(PredictRes::from(&result))),
        Err(e) => {
            tracing::error!("Predict error: {:?}", e);
            Err(error_status(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/examples",
    responses(
        (status = 200, description = "Quick-fill presets and input examples", body = ExamplesRes)
    )
)]
async fn examples() -> Json<ExamplesRes> {
    Json(ExamplesRes::standard())
}

#[utoipa::path(
    get,
    path = "/model",
    responses(
        (status = 200, description = "Installed model statistics", body = ModelInfoRes),
        (status = 503, description = "No model loaded")
    )
)]
/// Statistics of the installed model
async fn model_info(
    State(state): State<AppState>,
) -> Result<Json<ModelInfoRes>, (StatusCode, &'static str)> {
    state
        .pipeline
        .engine()
        .summary()
        .map(|summary| Json(ModelInfoRes::from(summary)))
        .ok_or_else(|| error_status(&CoreError::ModelNotReady))
}
