use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::models::{ErrorResponse, HealthResponse, ValidateRequest};
use super::AppState;
use crate::models::ValidationResult;
use crate::utils::DocumentError;

pub const SERVICE_NAME: &str = "Document Validation API";

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Result<Router, DocumentError> {
    let cors = cors_layer(allowed_origins)?;

    Ok(Router::new()
        .route("/api/validate-document-ocr", post(validate_document))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(cors))
}

pub async fn serve(app: Router, addr: SocketAddr) -> Result<(), DocumentError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DocumentError::Io(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("Starting HTTP server on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| DocumentError::Io(format!("Server error: {}", e)))
}

// One policy for every route, preflight included
fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, DocumentError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim()).map_err(|e| {
                DocumentError::Config(format!("Invalid allowed origin {:?}: {}", origin, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn validate_document(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError> {
    let image = match payload {
        Ok(Json(ValidateRequest { image: Some(image) })) => image,
        Ok(_) => return Err(bad_request()),
        Err(rejection) => {
            warn!("Rejected validation request body: {}", rejection);
            return Err(bad_request());
        }
    };

    // OCR is synchronous and slow; keep it off the async workers
    let validator = state.validator.clone();
    let result = tokio::task::spawn_blocking(move || validator.validate(&image))
        .await
        .map_err(|err| {
            error!("Validation task failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("server error: {}", err),
                }),
            )
        })?;

    Ok(Json(result))
}

fn bad_request() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "image field required".to_string(),
        }),
    )
}
