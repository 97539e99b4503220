use crate::models::{ClassificationOutcome, DocumentType, RuleSet};
use crate::utils::DocumentError;
use log::debug;
use regex::Regex;

struct CompiledTypeRule {
    document_type: DocumentType,
    patterns: Vec<Regex>,
    min_matches: usize,
    confidence_floor: Option<f64>,
}

/// Rule-based document type classifier over OCR text.
///
/// Types are tried in the rule set's priority order and the first one reaching its
/// `min_matches` threshold is returned, even if a later type would match more patterns.
/// Confidence is the share of the type's patterns found, in percent, raised to the type's
/// floor when it has one.
pub struct DocumentClassifier {
    rules: Vec<CompiledTypeRule>,
}

impl DocumentClassifier {
    pub fn new(rules: &RuleSet) -> Result<Self, DocumentError> {
        rules.validate()?;

        let mut compiled = Vec::with_capacity(rules.document_types.len());
        for rule in &rules.document_types {
            let patterns = rule
                .patterns
                .iter()
                .map(|pattern| {
                    Regex::new(pattern).map_err(|e| {
                        DocumentError::InvalidRule(format!(
                            "Bad pattern {:?} for {}: {}",
                            pattern, rule.document_type, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            compiled.push(CompiledTypeRule {
                document_type: rule.document_type,
                patterns,
                min_matches: rule.min_matches,
                confidence_floor: rule.confidence_floor,
            });
        }

        Ok(DocumentClassifier { rules: compiled })
    }

    pub fn classify(&self, text: &str) -> ClassificationOutcome {
        let text_upper = text.to_uppercase();
        debug!(
            "Searching document patterns in: {}...",
            text_upper.chars().take(100).collect::<String>()
        );

        for rule in &self.rules {
            let matched: Vec<&str> = rule
                .patterns
                .iter()
                .filter(|pattern| pattern.is_match(&text_upper))
                .map(|pattern| pattern.as_str())
                .collect();

            debug!(
                "{}: {}/{} patterns found: {:?}",
                rule.document_type,
                matched.len(),
                rule.patterns.len(),
                matched
            );

            if matched.len() >= rule.min_matches {
                let ratio = matched.len() as f64 / rule.patterns.len() as f64 * 100.0;
                let confidence = match rule.confidence_floor {
                    Some(floor) => ratio.max(floor),
                    None => ratio,
                };
                return ClassificationOutcome {
                    document_type: rule.document_type,
                    confidence: confidence.min(100.0),
                };
            }
        }

        ClassificationOutcome::unknown()
    }
}
