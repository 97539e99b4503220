use crate::models::{ClassificationOutcome, DocumentType};

pub const VALIDITY_THRESHOLD: f64 = 20.0;
pub const BONUS_PER_FIELD: f64 = 10.0;
pub const MAX_FIELD_BONUS: f64 = 30.0;

pub const ERROR_NOT_RECOGNIZED: &str = "document type not recognized";
pub const ERROR_LOW_CONFIDENCE: &str = "confidence too low";

/// Validity verdict and reported confidence for one classified document.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_valid: bool,
    pub confidence: f64,
    pub errors: Vec<String>,
}

impl Verdict {
    /// Validity is decided on the base confidence; the field bonus is added afterwards and
    /// only changes the reported number. A result can therefore report a confidence above the
    /// threshold while being invalid.
    pub fn assess(outcome: &ClassificationOutcome, extracted_field_count: usize) -> Self {
        let recognized = outcome.document_type != DocumentType::Inconnu;
        let confident = outcome.confidence > VALIDITY_THRESHOLD;
        let is_valid = recognized && confident;

        let mut errors = Vec::new();
        if !is_valid {
            if !recognized {
                errors.push(ERROR_NOT_RECOGNIZED.to_string());
            }
            if !confident {
                errors.push(ERROR_LOW_CONFIDENCE.to_string());
            }
        }

        let confidence = with_field_bonus(outcome.confidence, extracted_field_count);

        Verdict {
            is_valid,
            confidence: round_to_tenth(confidence),
            errors,
        }
    }
}

/// Adds `min(fields * 10, 30)` when any field was extracted, clamped to [0, 100].
pub fn with_field_bonus(confidence: f64, extracted_field_count: usize) -> f64 {
    let bonus = if extracted_field_count > 0 {
        (extracted_field_count as f64 * BONUS_PER_FIELD).min(MAX_FIELD_BONUS)
    } else {
        0.0
    };
    (confidence + bonus).clamp(0.0, 100.0)
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
