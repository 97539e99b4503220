use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    /// Base64 image, raw or as a data URI
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
