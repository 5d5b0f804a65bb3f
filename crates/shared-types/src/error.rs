//! Failures that propagate to callers of the assembly pipeline

use thiserror::Error;

/// Hard failures. Missing data and degraded routing/extraction are reported
/// as values, never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("User data source unavailable: {0}")]
    DataSource(String),
}
