//! Structured field extraction from free text

#[cfg(feature = "server")]
mod combined;
pub mod free_text;

#[cfg(feature = "server")]
pub use combined::CombinedExtractor;
pub use free_text::extract_with_patterns;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{is_filled, FieldValues, TemplateField};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Extractor request failed: {0}")]
    Request(String),

    #[error("Malformed extractor response: {0}")]
    MalformedResponse(String),

    #[error("Extractor timed out after {0} ms")]
    Timeout(u64),
}

/// Best-effort extractor for the fields a template needs
#[async_trait]
pub trait DataExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        fields: &[TemplateField],
    ) -> Result<FieldValues, ExtractorError>;
}

/// Result of combined extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub values: FieldValues,
    /// True when the external extractor was configured but failed
    pub degraded: bool,
}

/// Merge two extractions; `preferred` wins for every key it fills
pub fn merge_extractions(preferred: FieldValues, fallback: FieldValues) -> FieldValues {
    let mut merged = fallback;
    merged.extend(preferred.into_iter().filter(|(_, v)| is_filled(v)));
    merged
}
