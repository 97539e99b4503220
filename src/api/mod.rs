//! HTTP API over the document validator.

mod handlers;
mod models;

pub use handlers::{build_router, serve};
pub use models::{ErrorResponse, HealthResponse, ValidateRequest};

use crate::DocumentValidator;
use std::sync::Arc;

/// Shared handler state; the validator (and its OCR engine) is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<DocumentValidator>,
}

impl AppState {
    pub fn new(validator: DocumentValidator) -> Self {
        AppState {
            validator: Arc::new(validator),
        }
    }
}
