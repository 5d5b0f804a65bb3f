//! Intake pipeline for letter requests
//!
//! Routes free-text requests to a template, gathers field values from the
//! user's profile and extracts what the request states explicitly. External
//! classifiers and extractors plug in behind traits; deterministic keyword and
//! regex logic always backs them up.

pub mod calendar;
pub mod classifier;
pub mod extractors;
pub mod formatting;
pub mod gatherer;
pub mod patterns;

#[cfg(feature = "server")]
pub use classifier::RequestRouter;
pub use classifier::{fallback_analysis, ClassifierError, RequestClassifier};
#[cfg(feature = "server")]
pub use extractors::CombinedExtractor;
pub use extractors::{
    extract_with_patterns, merge_extractions, DataExtractor, ExtractionOutcome, ExtractorError,
};
pub use formatting::{
    format_field_value, format_postal_code, format_swiss_date, format_swiss_phone,
    parse_swiss_date,
};
pub use gatherer::{gather_user_data, gather_user_data_on, ProviderError, UserDataProvider};
