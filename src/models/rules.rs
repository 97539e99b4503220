use crate::models::{DocumentType, FieldName};
use crate::utils::DocumentError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Pattern tables driving classification and field extraction.
///
/// The built-in tables come from `RuleSet::default()`; deployments can replace them with a
/// JSON file of the same shape so new language variants need no code change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Evaluated in order; the first type reaching its threshold wins.
    pub document_types: Vec<DocumentTypeRule>,
    pub fields: Vec<FieldRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeRule {
    pub document_type: DocumentType,
    /// Unanchored regexes searched in the uppercased OCR text.
    pub patterns: Vec<String>,
    #[serde(default = "default_min_matches")]
    pub min_matches: usize,
    /// Lowest confidence reported once the type is accepted.
    #[serde(default)]
    pub confidence_floor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: FieldName,
    /// Label alternatives as regex fragments.
    pub labels: Vec<String>,
    /// Character run captured as the value.
    pub value: String,
}

fn default_min_matches() -> usize {
    2
}

impl FieldRule {
    fn new(field: FieldName, labels: &[&str], value: &str) -> Self {
        FieldRule {
            field,
            labels: labels.iter().map(|label| label.to_string()).collect(),
            value: value.to_string(),
        }
    }

    /// Case-insensitive, multiline pattern: label, optional colon, captured value.
    pub fn pattern(&self) -> String {
        format!(r"(?im)(?:{})\s*:?\s*({})", self.labels.join("|"), self.value)
    }
}

impl DocumentTypeRule {
    fn new(document_type: DocumentType, patterns: &[&str]) -> Self {
        DocumentTypeRule {
            document_type,
            patterns: patterns.iter().map(|pattern| pattern.to_string()).collect(),
            min_matches: default_min_matches(),
            confidence_floor: None,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        let carte_identite = DocumentTypeRule::new(
            DocumentType::CarteIdentite,
            &[
                r"RÉPUBLIQUE\s+FRANÇAISE",
                r"CARTE\s+NATIONALE\s+D'IDENTITÉ",
                r"CARTE\s+D'IDENTITÉ",
                r"PRÉFECTURE",
                r"VALABLE\s+JUSQU'AU",
            ],
        );

        // Passport layouts vary a lot, so one signal is enough and a floor keeps sparse
        // matches from scoring near zero.
        let passeport = DocumentTypeRule {
            min_matches: 1,
            confidence_floor: Some(25.0),
            ..DocumentTypeRule::new(
                DocumentType::Passeport,
                &[
                    r"PASSEPORT",
                    r"PASSPORT",
                    r"RÉPUBLIQUE\s+FRANÇAISE",
                    r"REPUBLIQUE\s+FRANCAISE",
                    r"RÉPUBLIQUE\s+TUNISIENNE",
                    r"REPUBLIQUE\s+TUNISIENNE",
                    r"TUNISIAN\s+REPUBLIC",
                    r"REPUBLIC\s+OF\s+TUNISIA",
                    r"TYPE\s*P",
                    r"FRANCE",
                    r"TUNISIA",
                    r"TUNISIE",
                    r"FRENCH\s+REPUBLIC",
                    r"P<FRA",
                    r"P<TUN",
                    r"FRANÇAIS",
                    r"FRANCAIS",
                    r"TUNISIAN",
                    r"TUN",
                    r"SPECIMEN",
                    r"SPÉCIMEN",
                    r"P<",
                    // MRZ-like passport number
                    r"[A-Z]{2}[A-Z0-9]{6,9}",
                    r"\d{2}\s*\d{2}\s*\d{4}",
                    r"M\s*[A-Z]",
                    r"F\s*[A-Z]",
                ],
            )
        };

        let permis_conduire = DocumentTypeRule::new(
            DocumentType::PermisConduire,
            &[
                r"PERMIS\s+DE\s+CONDUIRE",
                r"DRIVING\s+LICENCE",
                r"RÉPUBLIQUE\s+FRANÇAISE",
                r"PRÉFECTURE",
            ],
        );

        let fields = vec![
            FieldRule::new(
                FieldName::Nom,
                &["NOM", "SURNAME", "NAME", "اللقب"],
                r"[A-ZÀÁÂÃÄÅÆÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖØÙÚÛÜÝÞŸ\s\-']+",
            ),
            FieldRule::new(
                FieldName::Prenom,
                &["PRÉNOM", "PRENOM", r"GIVEN\s+NAME", r"FIRST\s+NAME", "الاسم"],
                r"[A-ZÀÁÂÃÄÅÆÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖØÙÚÛÜÝÞÿa-z\s\-']+",
            ),
            FieldRule::new(
                FieldName::DateNaissance,
                &[r"NÉ\s+LE", r"NEE?\s+LE", r"DATE\s+OF\s+BIRTH", "BIRTH", r"تاريخ\s+الولادة"],
                r"\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}",
            ),
            FieldRule::new(
                FieldName::NumeroId,
                &["N°", "NO", "NUM", "NUMERO", "رقم"],
                r"[A-Z0-9]{8,15}",
            ),
        ];

        RuleSet {
            document_types: vec![carte_identite, passeport, permis_conduire],
            fields,
        }
    }
}

impl RuleSet {
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let rules: RuleSet = serde_json::from_str(json)
            .map_err(|e| DocumentError::InvalidRule(format!("Failed to parse rule set: {}", e)))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DocumentError::Io(format!("Failed to read rule file {:?}: {}", path, e))
        })?;
        Self::from_json_str(&json)
    }

    /// Structural checks; regex syntax is checked when the tables are compiled.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.document_types.is_empty() {
            return Err(DocumentError::InvalidRule(
                "At least one document type rule is required".to_string(),
            ));
        }

        let mut seen_types = HashSet::new();
        for rule in &self.document_types {
            match rule.document_type {
                DocumentType::Inconnu | DocumentType::Erreur | DocumentType::Illisible => {
                    return Err(DocumentError::InvalidRule(format!(
                        "{} is not a classifiable document type",
                        rule.document_type
                    )));
                }
                _ => {}
            }
            if !seen_types.insert(rule.document_type) {
                return Err(DocumentError::InvalidRule(format!(
                    "Duplicate rule for document type {}",
                    rule.document_type
                )));
            }
            if rule.patterns.is_empty() {
                return Err(DocumentError::InvalidRule(format!(
                    "Document type {} has no patterns",
                    rule.document_type
                )));
            }
            if rule.min_matches == 0 || rule.min_matches > rule.patterns.len() {
                return Err(DocumentError::InvalidRule(format!(
                    "Document type {} needs min_matches between 1 and {}",
                    rule.document_type,
                    rule.patterns.len()
                )));
            }
            if let Some(floor) = rule.confidence_floor {
                if !(0.0..=100.0).contains(&floor) {
                    return Err(DocumentError::InvalidRule(format!(
                        "Document type {} has confidence floor {} outside 0-100",
                        rule.document_type, floor
                    )));
                }
            }
        }

        let mut seen_fields = HashSet::new();
        for rule in &self.fields {
            if !seen_fields.insert(rule.field) {
                return Err(DocumentError::InvalidRule(format!(
                    "Duplicate rule for field {}",
                    rule.field
                )));
            }
            if rule.labels.is_empty() || rule.value.is_empty() {
                return Err(DocumentError::InvalidRule(format!(
                    "Field {} needs at least one label and a value pattern",
                    rule.field
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_priority_order() {
        let rules = RuleSet::default();
        let order: Vec<DocumentType> = rules
            .document_types
            .iter()
            .map(|rule| rule.document_type)
            .collect();
        assert_eq!(
            order,
            vec![
                DocumentType::CarteIdentite,
                DocumentType::Passeport,
                DocumentType::PermisConduire
            ]
        );
        assert_eq!(rules.document_types[0].patterns.len(), 5);
        assert_eq!(rules.document_types[1].patterns.len(), 26);
        assert_eq!(rules.document_types[2].patterns.len(), 4);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_field_pattern_shape() {
        let rule = FieldRule::new(FieldName::NumeroId, &["NO", "NUM"], "[0-9]+");
        assert_eq!(rule.pattern(), r"(?im)(?:NO|NUM)\s*:?\s*([0-9]+)");
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let json = serde_json::to_string(&RuleSet::default()).unwrap();
        let parsed = RuleSet::from_json_str(&json).unwrap();
        assert_eq!(parsed, RuleSet::default());
    }

    #[test]
    fn test_min_matches_defaults_to_two() {
        let json = r#"{
            "document_types": [
                {"document_type": "permis_conduire", "patterns": ["PERMIS", "LICENCE"]}
            ],
            "fields": []
        }"#;
        let rules = RuleSet::from_json_str(json).unwrap();
        assert_eq!(rules.document_types[0].min_matches, 2);
        assert_eq!(rules.document_types[0].confidence_floor, None);
    }

    #[test]
    fn test_rejects_unclassifiable_type() {
        let json = r#"{
            "document_types": [{"document_type": "inconnu", "patterns": ["X"], "min_matches": 1}],
            "fields": []
        }"#;
        let err = RuleSet::from_json_str(json).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidRule(_)));
    }

    #[test]
    fn test_rejects_impossible_threshold() {
        let mut rules = RuleSet::default();
        rules.document_types[2].min_matches = 9;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let mut rules = RuleSet::default();
        let duplicate = rules.fields[0].clone();
        rules.fields.push(duplicate);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(&RuleSet::default()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let rules = RuleSet::from_json_file(file.path()).unwrap();
        assert_eq!(rules.fields.len(), 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RuleSet::from_json_file("/nonexistent/rules.json").unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }
}
