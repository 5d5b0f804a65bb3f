//! Template registry and metadata

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::{Category, DocumentType, Template, RESERVED_FIELDS};
use tracing::{debug, info, warn};

use super::embedded;
use crate::assembler::errors::EngineError;
use crate::assembler::render::template_variables;

/// Summary of an available template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub document_type: DocumentType,
    pub category: Category,
    pub version: String,
    /// Keys of required fields
    pub required_fields: Vec<String>,
    /// Keys of optional fields
    pub optional_fields: Vec<String>,
}

impl From<&Template> for TemplateInfo {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            document_type: template.document_type,
            category: template.category,
            version: template.metadata.version.clone(),
            required_fields: template.required_fields.iter().map(|f| f.key.clone()).collect(),
            optional_fields: template.optional_fields.iter().map(|f| f.key.clone()).collect(),
        }
    }
}

/// Read-only source of templates.
///
/// Each load returns an independent copy; callers may not observe changes
/// between calls.
pub trait TemplateStore: Send + Sync {
    fn load_template(&self, id: &str) -> Result<Template, EngineError>;

    fn list_templates(&self) -> Vec<TemplateInfo>;
}

/// Templates compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

impl TemplateStore for EmbeddedTemplates {
    fn load_template(&self, id: &str) -> Result<Template, EngineError> {
        load_template(id)
    }

    fn list_templates(&self) -> Vec<TemplateInfo> {
        list_templates()
    }
}

/// Templates loaded from a directory of JSON definitions
#[derive(Debug, Clone, Default)]
pub struct DirectoryTemplates {
    templates: BTreeMap<String, Template>,
}

impl DirectoryTemplates {
    /// Load every `*.json` file in `dir`. Any invalid definition fails the load.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EngineError> {
        let dir = dir.as_ref();
        let mut templates = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let source = std::fs::read_to_string(&path)?;
            let template = parse_template(&path.display().to_string(), &source)?;
            debug!(id = %template.id, path = %path.display(), "Loaded template definition");
            templates.push(template);
        }

        info!(count = templates.len(), dir = %dir.display(), "Loaded template directory");
        Self::from_templates(templates)
    }

    /// Build a store from already-parsed templates
    pub fn from_templates(templates: Vec<Template>) -> Result<Self, EngineError> {
        let mut map = BTreeMap::new();
        for template in templates {
            let undeclared = check_template_variables(&template);
            if !undeclared.is_empty() {
                return Err(EngineError::InvalidTemplate(
                    template.id.clone(),
                    format!("undeclared variables: {}", undeclared.join(", ")),
                ));
            }
            if map.contains_key(&template.id) {
                return Err(EngineError::InvalidTemplate(
                    template.id.clone(),
                    "duplicate template id".to_string(),
                ));
            }
            map.insert(template.id.clone(), template);
        }
        Ok(Self { templates: map })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for DirectoryTemplates {
    fn load_template(&self, id: &str) -> Result<Template, EngineError> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::TemplateNotFound(id.to_string()))
    }

    fn list_templates(&self) -> Vec<TemplateInfo> {
        self.templates.values().map(TemplateInfo::from).collect()
    }
}

/// Several stores queried in order; the first layer holding an id wins
#[derive(Clone, Default)]
pub struct LayeredTemplates {
    layers: Vec<Arc<dyn TemplateStore>>,
}

impl LayeredTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Arc<dyn TemplateStore>) -> Self {
        self.layers.push(layer);
        self
    }
}

impl TemplateStore for LayeredTemplates {
    fn load_template(&self, id: &str) -> Result<Template, EngineError> {
        for layer in &self.layers {
            match layer.load_template(id) {
                Err(EngineError::TemplateNotFound(_)) => continue,
                other => return other,
            }
        }
        Err(EngineError::TemplateNotFound(id.to_string()))
    }

    fn list_templates(&self) -> Vec<TemplateInfo> {
        let mut seen = HashSet::new();
        self.layers
            .iter()
            .flat_map(|layer| layer.list_templates())
            .filter(|info| seen.insert(info.id.clone()))
            .collect()
    }
}

/// List all embedded templates
pub fn list_templates() -> Vec<TemplateInfo> {
    embedded::EMBEDDED_TEMPLATE_IDS
        .iter()
        .filter_map(|id| match load_template(id) {
            Ok(template) => Some(TemplateInfo::from(&template)),
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping unreadable embedded template");
                None
            }
        })
        .collect()
}

/// Get the raw JSON definition of an embedded template
pub fn get_template_source(id: &str) -> Result<&'static str, EngineError> {
    embedded::get_embedded_template(id).ok_or_else(|| EngineError::TemplateNotFound(id.to_string()))
}

/// Load an embedded template by id
pub fn load_template(id: &str) -> Result<Template, EngineError> {
    parse_template(id, get_template_source(id)?)
}

/// Parse a JSON template definition; `origin` names it in errors
pub fn parse_template(origin: &str, source: &str) -> Result<Template, EngineError> {
    serde_json::from_str(source)
        .map_err(|e| EngineError::InvalidTemplate(origin.to_string(), e.to_string()))
}

/// Variables (and guard fields) a template references without declaring them
pub fn check_template_variables(template: &Template) -> Vec<String> {
    let declared: HashSet<&str> = template
        .fields()
        .map(|f| f.key.as_str())
        .chain(RESERVED_FIELDS.iter().copied())
        .collect();

    let mut undeclared = Vec::new();
    for block in &template.content {
        let referenced = template_variables(&block.content)
            .into_iter()
            .chain(block.condition.iter().map(|c| c.field.clone()));
        for key in referenced {
            if !declared.contains(key.as_str()) && !undeclared.contains(&key) {
                undeclared.push(key);
            }
        }
    }
    undeclared
}
