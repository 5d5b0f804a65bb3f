//! Document assembly: guards, substitution, HTML rendering and validation

pub mod conditions;
pub mod errors;
pub mod output;
pub mod render;
pub mod validation;

pub use conditions::evaluate_condition;
pub use errors::EngineError;
pub use output::{OutputFormat, PDF_UNAVAILABLE_MESSAGE};
pub use render::{
    assemble_document, assemble_document_at, placeholder, substitute_variables,
    template_variables,
};
pub use validation::validate_required_data;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{FieldValues, Template};

/// A rendered document ready to be sent to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub body: String,
    pub mime_type: String,
    /// Suggested attachment file name
    pub filename: String,
}

/// Assemble a template into the requested output format.
///
/// Only HTML is produced in-process; PDF requests fail with
/// [`EngineError::FormatUnavailable`] carrying a print-to-PDF hint.
pub fn render_document(
    template: &Template,
    data: &FieldValues,
    format: OutputFormat,
    generated_at: DateTime<Utc>,
) -> Result<RenderedDocument, EngineError> {
    if !format.is_supported() {
        return Err(EngineError::FormatUnavailable(
            PDF_UNAVAILABLE_MESSAGE.to_string(),
        ));
    }

    Ok(RenderedDocument {
        body: assemble_document_at(template, data, generated_at),
        mime_type: format.mime_type().to_string(),
        filename: format!(
            "{}-{}.{}",
            template.id,
            generated_at.format("%Y-%m-%d"),
            format.extension()
        ),
    })
}
