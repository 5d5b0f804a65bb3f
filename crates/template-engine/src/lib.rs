//! Letter template engine
//!
//! This crate provides the template store and the document assembler:
//! - Embedded and directory-backed template definitions
//! - Conditional block guards and `{{variable}}` substitution
//! - HTML rendering with visible placeholders for missing data
//! - Required-field validation

pub mod assembler;
pub mod templates;

pub use assembler::{
    assemble_document, assemble_document_at, render_document, validate_required_data,
    EngineError, OutputFormat, RenderedDocument,
};
pub use templates::{load_template, list_templates, TemplateInfo, TemplateStore};
