//! HTTP-level tests for the validation API, wired to a fixed-output OCR engine.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http_body_util::BodyExt;
use idscan::api::{build_router, AppState};
use idscan::models::OcrFragment;
use idscan::processing::{ImageProcessor, OcrEngine};
use idscan::utils::DocumentError;
use idscan::DocumentValidator;
use image::{GrayImage, Luma};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct FixedOcr(Vec<&'static str>);

impl OcrEngine for FixedOcr {
    fn name(&self) -> &str {
        "fixed"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<OcrFragment>, DocumentError> {
        Ok(self.0.iter().map(|text| OcrFragment::new(*text, 0.95)).collect())
    }
}

struct PanickingOcr;

impl OcrEngine for PanickingOcr {
    fn name(&self) -> &str {
        "panicking"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<OcrFragment>, DocumentError> {
        panic!("engine crashed")
    }
}

fn origins() -> Vec<String> {
    vec![
        "http://localhost:4200".to_string(),
        "http://127.0.0.1:4200".to_string(),
    ]
}

fn app(fragments: Vec<&'static str>) -> Router {
    let validator = DocumentValidator::with_default_rules(Arc::new(FixedOcr(fragments))).unwrap();
    build_router(AppState::new(validator), &origins()).unwrap()
}

fn png_base64() -> String {
    let img = GrayImage::from_pixel(12, 12, Luma([200u8]));
    STANDARD.encode(ImageProcessor::encode_png(&img).unwrap())
}

fn post_json(body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/validate-document-ocr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(vec![])
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "Document Validation API");
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn test_identity_card_scenario() {
    let app = app(vec![
        "RÉPUBLIQUE FRANÇAISE",
        "CARTE NATIONALE D'IDENTITÉ",
        "PRÉFECTURE",
        "NOM: DUPONT",
        "PRÉNOM: Jean",
    ]);
    let payload = json!({ "image": format!("data:image/png;base64,{}", png_base64()) });

    let response = app.oneshot(post_json(payload.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["isValidDocument"], true);
    assert_eq!(body["documentType"], "carte_identite");
    assert_eq!(body["confidence"], 80.0);
    assert_eq!(body["extractedFields"]["prenom"], "Jean");
    assert_eq!(body["debugInfo"]["ocrFragmentCount"], 5);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_empty_image_is_decode_error() {
    let response = app(vec!["PASSPORT"])
        .oneshot(post_json(json!({ "image": "" }).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isValidDocument"], false);
    assert_eq!(body["documentType"], "erreur");
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["errors"], json!(["image decode failed"]));
}

#[tokio::test]
async fn test_image_without_text() {
    let response = app(vec![])
        .oneshot(post_json(json!({ "image": png_base64() }).to_string()))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["isValidDocument"], false);
    assert_eq!(body["documentType"], "illisible");
    assert_eq!(body["confidence"], 0.0);
    assert_eq!(body["errors"], json!(["no text detected"]));
}

#[tokio::test]
async fn test_engine_panic_is_server_error() {
    let validator = DocumentValidator::with_default_rules(Arc::new(PanickingOcr)).unwrap();
    let app = build_router(AppState::new(validator), &origins()).unwrap();

    let response = app
        .oneshot(post_json(json!({ "image": png_base64() }).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("server error: "));
    assert!(error.contains("engine crashed"));
}

#[tokio::test]
async fn test_missing_image_field() {
    let response = app(vec![])
        .oneshot(post_json("{}".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "image field required");
}

#[tokio::test]
async fn test_malformed_body() {
    let response = app(vec![])
        .oneshot(post_json("not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "image field required");
}

#[tokio::test]
async fn test_preflight_for_allowed_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/validate-document-ocr")
        .header(header::ORIGIN, "http://localhost:4200")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app(vec![]).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:4200"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn test_unknown_origin_gets_no_cors_headers() {
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app(vec![]).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_invalid_origin_configuration() {
    let validator = DocumentValidator::with_default_rules(Arc::new(FixedOcr(vec![]))).unwrap();
    let result = build_router(AppState::new(validator), &["bad\norigin".to_string()]);
    assert!(matches!(result, Err(DocumentError::Config(_))));
}
