//! Request classification
//!
//! Free text is routed to a template by an external classifier when one is
//! configured, with deterministic keyword matching as the fallback.

#[cfg(feature = "server")]
mod router;

#[cfg(feature = "server")]
pub use router::RequestRouter;

use async_trait::async_trait;
use shared_types::{
    Category, DocumentType, RoutingAnalysis, RoutingSource, Tone, FALLBACK_CONFIDENCE_CEILING,
};
use thiserror::Error;

use crate::patterns::{
    contains_any, matched_keywords, COMPLAINT_KEYWORDS, HEALTH_KEYWORDS, HOUSING_KEYWORDS,
    INSURANCE_KEYWORDS, TERMINATION_KEYWORDS,
};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Request(String),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("Classifier timed out after {0} ms")]
    Timeout(u64),
}

/// Natural-language classifier mapping a request to a [`RoutingAnalysis`]
#[async_trait]
pub trait RequestClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<RoutingAnalysis, ClassifierError>;
}

/// Deterministic keyword routing. Never fails.
///
/// Rules are checked in order; the first match wins:
/// 1. termination + insurance + health → health insurance termination
/// 2. termination + housing → lease termination
/// 3. complaint → general complaint
/// 4. anything else → generic formal letter
pub fn fallback_analysis(text: &str) -> RoutingAnalysis {
    let lower = text.to_lowercase();

    let terminates = contains_any(&lower, TERMINATION_KEYWORDS);
    let (document_type, category, template, confidence, reasoning) = if terminates
        && contains_any(&lower, INSURANCE_KEYWORDS)
        && contains_any(&lower, HEALTH_KEYWORDS)
    {
        (
            DocumentType::TerminationLetter,
            Category::Insurance,
            "assurance-maladie",
            FALLBACK_CONFIDENCE_CEILING,
            format!(
                "Résiliation d'assurance maladie détectée (mots-clés : {})",
                keywords_found(&lower, &[TERMINATION_KEYWORDS, HEALTH_KEYWORDS])
            ),
        )
    } else if terminates && contains_any(&lower, HOUSING_KEYWORDS) {
        (
            DocumentType::TerminationLetter,
            Category::Housing,
            "resiliation-bail",
            FALLBACK_CONFIDENCE_CEILING,
            format!(
                "Résiliation de bail détectée (mots-clés : {})",
                keywords_found(&lower, &[TERMINATION_KEYWORDS, HOUSING_KEYWORDS])
            ),
        )
    } else if contains_any(&lower, COMPLAINT_KEYWORDS) {
        (
            DocumentType::Complaint,
            Category::Legal,
            "reclamation-generale",
            0.6,
            format!(
                "Réclamation détectée (mots-clés : {})",
                keywords_found(&lower, &[COMPLAINT_KEYWORDS])
            ),
        )
    } else {
        (
            DocumentType::FormalLetter,
            Category::Administrative,
            "lettre-formelle",
            0.4,
            "Aucun type de demande reconnu, lettre formelle générique".to_string(),
        )
    };

    RoutingAnalysis {
        document_type,
        category,
        suggested_template: template.to_string(),
        required_fields: Vec::new(),
        tone: Tone::Formal,
        language: "fr".to_string(),
        confidence,
        reasoning,
        source: RoutingSource::Fallback,
    }
}

fn keywords_found(lower: &str, lists: &[&[&str]]) -> String {
    lists
        .iter()
        .flat_map(|list| matched_keywords(lower, list))
        .collect::<Vec<_>>()
        .join(", ")
}
