use std::sync::Arc;
use std::time::Duration;

use shared_types::{FieldValues, TemplateField};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{extract_with_patterns, merge_extractions, DataExtractor, ExtractionOutcome, ExtractorError};

/// Regex extraction combined with an optional external extractor
#[derive(Clone)]
pub struct CombinedExtractor {
    extractor: Option<Arc<dyn DataExtractor>>,
    timeout: Duration,
}

impl CombinedExtractor {
    pub fn new(extractor: Option<Arc<dyn DataExtractor>>, timeout: Duration) -> Self {
        Self { extractor, timeout }
    }

    pub fn regex_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Run both extractors. Regex always runs; the external extractor gets a
    /// single bounded attempt and its values win per key.
    pub async fn extract_data_combined(
        &self,
        text: &str,
        fields: &[TemplateField],
    ) -> ExtractionOutcome {
        let regex_values = extract_with_patterns(text);

        let Some(extractor) = &self.extractor else {
            return ExtractionOutcome {
                values: regex_values,
                degraded: false,
            };
        };

        let external = match timeout(self.timeout, extractor.extract(text, fields)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractorError::Timeout(self.timeout.as_millis() as u64)),
        };

        match external {
            Ok(values) => {
                debug!(
                    external = values.len(),
                    regex = regex_values.len(),
                    "Combined extraction"
                );
                ExtractionOutcome {
                    values: merge_extractions(values, regex_values),
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "ExtractionDegraded: using regex extraction only");
                ExtractionOutcome {
                    values: regex_values,
                    degraded: true,
                }
            }
        }
    }
}

impl Default for CombinedExtractor {
    fn default() -> Self {
        Self::regex_only()
    }
}
