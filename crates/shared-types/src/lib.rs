pub mod error;
pub mod routing;
pub mod template;
pub mod types;

pub use error::CoreError;
pub use routing::{RoutingAnalysis, RoutingSource, Tone, FALLBACK_CONFIDENCE_CEILING};
pub use template::{
    Alignment, BlockCondition, BlockStyle, BlockType, CalculationRule, Category, ConditionOperator,
    ContentBlock, DocumentType, FieldSource, FieldType, Template, TemplateField, TemplateMetadata,
};
pub use types::{
    is_filled, FieldValues, GatheredData, ValidationReport, DATE_ENVOI, RESERVED_FIELDS,
};
