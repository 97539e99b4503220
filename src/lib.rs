pub mod api;
pub mod config;
pub mod document_validator;
pub mod models;
pub mod processing;
pub mod utils;
pub mod validation;

pub use document_validator::DocumentValidator;
