use std::sync::Arc;
use std::time::Duration;

use shared_types::{RoutingAnalysis, RoutingSource, FALLBACK_CONFIDENCE_CEILING};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{fallback_analysis, ClassifierError, RequestClassifier};

/// Routes requests through an optional classifier, falling back to keywords.
///
/// The classifier gets a single attempt bounded by `timeout`; there are no
/// retries.
#[derive(Clone)]
pub struct RequestRouter {
    classifier: Option<Arc<dyn RequestClassifier>>,
    timeout: Duration,
}

impl RequestRouter {
    pub fn new(classifier: Option<Arc<dyn RequestClassifier>>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    /// Router that only ever uses keyword matching
    pub fn fallback_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Analyze a request. Never fails; degraded results carry
    /// [`RoutingSource::Fallback`].
    pub async fn analyze_request(&self, text: &str) -> RoutingAnalysis {
        let Some(classifier) = &self.classifier else {
            debug!("No classifier configured, using keyword routing");
            return fallback_analysis(text);
        };

        let result = match timeout(self.timeout, classifier.classify(text)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(mut analysis) => {
                analysis.confidence = analysis.confidence.clamp(0.0, 1.0);
                analysis.source = RoutingSource::Classifier;
                debug!(
                    template = %analysis.suggested_template,
                    confidence = analysis.confidence,
                    "Request classified"
                );
                analysis
            }
            Err(e) => {
                warn!(error = %e, "ClassificationDegraded: using keyword routing");
                let analysis = fallback_analysis(text);
                debug_assert!(analysis.confidence <= FALLBACK_CONFIDENCE_CEILING);
                analysis
            }
        }
    }
}
