use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("Image processing error: {0}")]
    ImageProcessing(String),
    #[error("OCR engine error: {0}")]
    OcrEngine(String),
    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),
    #[error("Invalid rule: {0}")]
    InvalidRule(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        DocumentError::Io(err.to_string())
    }
}
