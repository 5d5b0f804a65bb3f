//! Template management and embedded templates

pub mod embedded;
pub mod registry;

pub use registry::{
    check_template_variables, get_template_source, list_templates, load_template, parse_template,
    DirectoryTemplates, EmbeddedTemplates, LayeredTemplates, TemplateInfo, TemplateStore,
};
