//! Required-field validation, run by callers before assembly

use regex::Regex;
use shared_types::{FieldValues, TemplateField, ValidationReport};
use tracing::warn;

use super::render::value_to_text;

/// Check every `required` field for presence and, when it declares one, its
/// validation pattern. Missing entries are reported by label.
pub fn validate_required_data(data: &FieldValues, fields: &[TemplateField]) -> ValidationReport {
    let mut missing = Vec::new();

    for field in fields.iter().filter(|f| f.required) {
        let Some(text) = data.get(&field.key).and_then(value_to_text) else {
            missing.push(field.label.clone());
            continue;
        };

        if let Some(pattern) = &field.validation {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(text.trim()) {
                        missing.push(format!("{} (format invalide)", field.label));
                    }
                }
                Err(e) => {
                    warn!(field = %field.key, error = %e, "Ignoring invalid validation pattern");
                }
            }
        }
    }

    ValidationReport {
        valid: missing.is_empty(),
        missing,
    }
}
