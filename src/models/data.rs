use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Document categories reported by the validator.
///
/// The first three are classifier outcomes; `Inconnu` means no pattern set reached its
/// threshold, while `Erreur` and `Illisible` are only produced by the pipeline's early exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    CarteIdentite,
    Passeport,
    PermisConduire,
    Inconnu,
    Erreur,
    Illisible,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::CarteIdentite => "carte_identite",
            DocumentType::Passeport => "passeport",
            DocumentType::PermisConduire => "permis_conduire",
            DocumentType::Inconnu => "inconnu",
            DocumentType::Erreur => "erreur",
            DocumentType::Illisible => "illisible",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personal data fields the extractor knows how to find.
///
/// Declaration order is the order fields appear in serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Nom,
    Prenom,
    DateNaissance,
    NumeroId,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Nom => "nom",
            FieldName::Prenom => "prenom",
            FieldName::DateNaissance => "date_naissance",
            FieldName::NumeroId => "numero_id",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of recognized text with the engine's detection confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrFragment {
    pub text: String,
    pub confidence: f32,
}

impl OcrFragment {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        OcrFragment {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationOutcome {
    pub document_type: DocumentType,
    /// Base confidence in percent, before any extraction bonus.
    pub confidence: f64,
}

impl ClassificationOutcome {
    pub fn unknown() -> Self {
        ClassificationOutcome {
            document_type: DocumentType::Inconnu,
            confidence: 0.0,
        }
    }
}

/// Normalized values keyed by field; only matched fields are present.
pub type ExtractedFields = BTreeMap<FieldName, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub text_length: usize,
    pub ocr_fragment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid_document: bool,
    pub document_type: DocumentType,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<ExtractedFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl ValidationResult {
    /// Result for the pipeline's early exits: never valid, zero confidence, one error.
    pub fn failure(document_type: DocumentType, error: impl Into<String>) -> Self {
        ValidationResult {
            is_valid_document: false,
            document_type,
            confidence: 0.0,
            extracted_fields: None,
            errors: Some(vec![error.into()]),
            debug_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_in_camel_case() {
        let mut fields = ExtractedFields::new();
        fields.insert(FieldName::NumeroId, "X1234567".to_string());
        fields.insert(FieldName::Nom, "Dupont".to_string());

        let result = ValidationResult {
            is_valid_document: true,
            document_type: DocumentType::CarteIdentite,
            confidence: 70.0,
            extracted_fields: Some(fields),
            errors: None,
            debug_info: Some(DebugInfo {
                text_length: 42,
                ocr_fragment_count: 3,
            }),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"isValidDocument":true,"documentType":"carte_identite","confidence":70.0,"extractedFields":{"nom":"Dupont","numero_id":"X1234567"},"debugInfo":{"textLength":42,"ocrFragmentCount":3}}"#
        );
    }

    #[test]
    fn test_failure_omits_optional_sections() {
        let result = ValidationResult::failure(DocumentType::Illisible, "no text detected");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["documentType"], "illisible");
        assert_eq!(value["errors"][0], "no text detected");
        assert!(value.get("extractedFields").is_none());
        assert!(value.get("debugInfo").is_none());
    }

    #[test]
    fn test_fragment_confidence_is_clamped() {
        assert_eq!(OcrFragment::new("A", 1.7).confidence, 1.0);
        assert_eq!(OcrFragment::new("B", -0.2).confidence, 0.0);
    }
}
