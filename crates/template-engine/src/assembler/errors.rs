//! Error types for template loading and document output

use thiserror::Error;

/// Template-engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template '{0}': {1}")]
    InvalidTemplate(String, String),

    #[error("Output format not available: {0}")]
    FormatUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
