pub mod extractors;
pub mod image;
pub mod ocr;

pub use extractors::FieldExtractor;
pub use image::ImageProcessor;
pub use ocr::{parse_tsv_fragments, OcrEngine};

#[cfg(feature = "tesseract")]
pub use ocr::TesseractEngine;
