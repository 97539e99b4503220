use crate::models::{DebugInfo, DocumentType, OcrFragment, RuleSet, ValidationResult};
use crate::processing::{FieldExtractor, ImageProcessor, OcrEngine};
use crate::utils::DocumentError;
use crate::validation::{DocumentClassifier, Verdict};
use image::DynamicImage;
use log::{error, info, warn};
use std::sync::Arc;

pub const ERROR_IMAGE_DECODE: &str = "image decode failed";
pub const ERROR_NO_TEXT: &str = "no text detected";

/// Runs decode, OCR, classification and extraction for one document image.
pub struct DocumentValidator {
    ocr: Arc<dyn OcrEngine>,
    classifier: DocumentClassifier,
    extractor: FieldExtractor,
}

impl DocumentValidator {
    pub fn new(ocr: Arc<dyn OcrEngine>, rules: &RuleSet) -> Result<Self, DocumentError> {
        Ok(DocumentValidator {
            ocr,
            classifier: DocumentClassifier::new(rules)?,
            extractor: FieldExtractor::new(rules)?,
        })
    }

    pub fn with_default_rules(ocr: Arc<dyn OcrEngine>) -> Result<Self, DocumentError> {
        Self::new(ocr, &RuleSet::default())
    }

    pub fn ocr_engine_name(&self) -> &str {
        self.ocr.name()
    }

    /// Main validation function. Never fails: unexpected errors become an `erreur` result.
    pub fn validate(&self, base64_image: &str) -> ValidationResult {
        match self.try_validate(base64_image) {
            Ok(result) => result,
            Err(err) => {
                error!("Document validation failed: {}", err);
                ValidationResult::failure(DocumentType::Erreur, format!("internal error: {}", err))
            }
        }
    }

    fn try_validate(&self, base64_image: &str) -> Result<ValidationResult, DocumentError> {
        // Step 1: Decode the image
        let image = match ImageProcessor::decode_base64(base64_image) {
            Ok(image) => image,
            Err(err) => {
                error!("{}", err);
                return Ok(ValidationResult::failure(DocumentType::Erreur, ERROR_IMAGE_DECODE));
            }
        };

        // Step 2: Preprocess and read the text
        let fragments = self.read_text(&image)?;
        let full_text = fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if full_text.trim().is_empty() {
            return Ok(ValidationResult::failure(DocumentType::Illisible, ERROR_NO_TEXT));
        }

        // Steps 3-7: classify, extract, score
        Ok(self.validate_text(&full_text, fragments.len()))
    }

    fn read_text(&self, image: &DynamicImage) -> Result<Vec<OcrFragment>, DocumentError> {
        let processed = ImageProcessor::preprocess(image);

        match self.ocr.recognize(&processed) {
            Ok(fragments) => Ok(fragments),
            // This image could not be read; the engine itself is still fine
            Err(DocumentError::OcrEngine(msg)) => {
                warn!("OCR failed on image, treating as unreadable: {}", msg);
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Classify and extract from already recognized text.
    pub fn validate_text(&self, full_text: &str, fragment_count: usize) -> ValidationResult {
        let outcome = self.classifier.classify(full_text);
        info!(
            "Detected type: {}, confidence: {:.1}%",
            outcome.document_type, outcome.confidence
        );

        let fields = self.extractor.extract(full_text);
        let verdict = Verdict::assess(&outcome, fields.len());

        ValidationResult {
            is_valid_document: verdict.is_valid,
            document_type: outcome.document_type,
            confidence: verdict.confidence,
            extracted_fields: if fields.is_empty() { None } else { Some(fields) },
            errors: if verdict.errors.is_empty() { None } else { Some(verdict.errors) },
            debug_info: Some(DebugInfo {
                text_length: full_text.chars().count(),
                ocr_fragment_count: fragment_count,
            }),
        }
    }
}
