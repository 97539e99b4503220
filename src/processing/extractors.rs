// Personal data extraction from OCR text
use crate::models::{ExtractedFields, FieldName, RuleSet};
use crate::utils::DocumentError;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anything that cannot be part of a name
    static ref NON_NAME_CHARS: Regex = Regex::new(r"[^\p{L}\s\-']").unwrap();
}

/// Accepted birth date layouts, tried in order.
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%d %m %Y"];

/// Extracts labeled personal fields (name, given name, birth date, ID number) from OCR text.
pub struct FieldExtractor {
    patterns: Vec<(FieldName, Regex)>,
}

impl FieldExtractor {
    pub fn new(rules: &RuleSet) -> Result<Self, DocumentError> {
        rules.validate()?;

        let mut patterns = Vec::with_capacity(rules.fields.len());
        for rule in &rules.fields {
            let pattern = Regex::new(&rule.pattern()).map_err(|e| {
                DocumentError::InvalidRule(format!("Bad pattern for field {}: {}", rule.field, e))
            })?;
            patterns.push((rule.field, pattern));
        }

        Ok(FieldExtractor { patterns })
    }

    /// Runs every field pattern once over the raw text. Unmatched fields are left out;
    /// a matched field is kept even when its normalized value is empty.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::new();

        for (field, pattern) in &self.patterns {
            let Some(captured) = pattern.captures(text).and_then(|caps| caps.get(1)) else {
                continue;
            };
            fields.insert(*field, normalize_field(*field, captured.as_str().trim()));
        }

        fields
    }
}

pub fn normalize_field(field: FieldName, value: &str) -> String {
    match field {
        FieldName::Nom | FieldName::Prenom => normalize_name(value),
        FieldName::DateNaissance => normalize_date(value),
        FieldName::NumeroId => value.split_whitespace().collect(),
    }
}

/// Reformats a day-first date as `YYYY-MM-DD`; unparsable input comes back unchanged.
pub fn normalize_date(date_str: &str) -> String {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_str, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date_str.to_string())
}

pub fn normalize_name(name: &str) -> String {
    let cleaned = NON_NAME_CHARS.replace_all(name, "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

// Uppercase the first letter of every letter run, lowercase the rest
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }

    result
}
