//! Routing analysis produced by request classification

use serde::{Deserialize, Serialize};

use crate::template::{Category, DocumentType};

/// Highest confidence the keyword fallback may report.
///
/// Classifier results above this value are distinguishable from best-guess
/// routing.
pub const FALLBACK_CONFIDENCE_CEILING: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Formal,
    Informal,
}

/// Which path produced a [`RoutingAnalysis`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingSource {
    /// External natural-language classifier
    Classifier,
    /// Deterministic keyword matching (classification degraded)
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingAnalysis {
    pub document_type: DocumentType,
    pub category: Category,
    pub suggested_template: String,
    /// Field keys the classifier believes the letter needs
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default = "default_language")]
    pub language: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
    #[serde(default)]
    pub reasoning: String,
    pub source: RoutingSource,
}

fn default_language() -> String {
    "fr".to_string()
}

impl RoutingAnalysis {
    /// True when the analysis came from keyword matching
    pub fn is_degraded(&self) -> bool {
        self.source == RoutingSource::Fallback
    }
}
