use std::collections::BTreeMap;

/// Resolved field values keyed by template field key
pub type FieldValues = BTreeMap<String, serde_json::Value>;

/// Reserved system field holding the date the letter is sent
pub const DATE_ENVOI: &str = "date_envoi";

/// Fields every template may reference without declaring them
pub const RESERVED_FIELDS: &[&str] = &[DATE_ENVOI];

/// Per-request result of resolving template fields
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GatheredData {
    pub available_fields: FieldValues,
    /// Keys of required fields that could not be resolved
    pub missing_fields: Vec<String>,
    /// One warning per entry of `missing_fields`, at the same index
    pub warnings: Vec<String>,
}

impl GatheredData {
    /// Record a resolved value, clearing any earlier missing entry for the key
    /// together with its warning
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        if let Some(pos) = self.missing_fields.iter().position(|k| k == &key) {
            self.missing_fields.remove(pos);
            if pos < self.warnings.len() {
                self.warnings.remove(pos);
            }
        }
        self.available_fields.insert(key, value);
    }

    /// Warning recorded for a missing key
    pub fn warning_for(&self, key: &str) -> Option<&str> {
        let pos = self.missing_fields.iter().position(|k| k == key)?;
        self.warnings.get(pos).map(String::as_str)
    }

    /// Record a missing required field unless it already resolved
    pub fn mark_missing(&mut self, key: impl Into<String>, warning: impl Into<String>) {
        let key = key.into();
        if self.available_fields.contains_key(&key) || self.missing_fields.contains(&key) {
            return;
        }
        self.missing_fields.push(key);
        self.warnings.push(warning.into());
    }
}

/// Outcome of checking required fields before assembly
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Field labels, suffixed with " (format invalide)" for pattern failures
    pub missing: Vec<String>,
}

/// True when a value counts as filled: not null, not an empty string or array
pub fn is_filled(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
