//! Template definitions: documents, fields and content blocks

use serde::{Deserialize, Serialize};

/// Closed set of document kinds a template can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "resiliation")]
    TerminationLetter,
    #[serde(rename = "remboursement")]
    RefundRequest,
    #[serde(rename = "reclamation")]
    Complaint,
    #[serde(rename = "demande_administrative")]
    AdministrativeRequest,
    #[serde(rename = "lettre_formelle")]
    FormalLetter,
    #[serde(rename = "attestation")]
    Attestation,
    #[serde(rename = "facture")]
    Invoice,
}

impl DocumentType {
    /// Wire value, as used in template definitions and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::TerminationLetter => "resiliation",
            DocumentType::RefundRequest => "remboursement",
            DocumentType::Complaint => "reclamation",
            DocumentType::AdministrativeRequest => "demande_administrative",
            DocumentType::FormalLetter => "lettre_formelle",
            DocumentType::Attestation => "attestation",
            DocumentType::Invoice => "facture",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resiliation" => Ok(DocumentType::TerminationLetter),
            "remboursement" => Ok(DocumentType::RefundRequest),
            "reclamation" => Ok(DocumentType::Complaint),
            "demande_administrative" => Ok(DocumentType::AdministrativeRequest),
            "lettre_formelle" => Ok(DocumentType::FormalLetter),
            "attestation" => Ok(DocumentType::Attestation),
            "facture" => Ok(DocumentType::Invoice),
            other => Err(format!("Unknown document type: {}", other)),
        }
    }
}

/// Business area a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "assurance")]
    Insurance,
    #[serde(rename = "logement")]
    Housing,
    #[serde(rename = "finance")]
    Finance,
    #[serde(rename = "administratif")]
    Administrative,
    #[serde(rename = "juridique")]
    Legal,
    #[serde(rename = "emploi")]
    Employment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Insurance => "assurance",
            Category::Housing => "logement",
            Category::Finance => "finance",
            Category::Administrative => "administratif",
            Category::Legal => "juridique",
            Category::Employment => "emploi",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assurance" => Ok(Category::Insurance),
            "logement" => Ok(Category::Housing),
            "finance" => Ok(Category::Finance),
            "administratif" => Ok(Category::Administrative),
            "juridique" => Ok(Category::Legal),
            "emploi" => Ok(Category::Employment),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// A parameterized document definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier (e.g. "assurance-maladie")
    pub id: String,
    /// Human-readable name, used as the HTML title
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub document_type: DocumentType,
    pub category: Category,
    /// Content blocks in rendering order
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub required_fields: Vec<TemplateField>,
    #[serde(default)]
    pub optional_fields: Vec<TemplateField>,
    pub metadata: TemplateMetadata,
}

impl Template {
    /// Every declared field, required ones first
    pub fn fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.required_fields.iter().chain(self.optional_fields.iter())
    }

    /// Look up a declared field by key
    pub fn field(&self, key: &str) -> Option<&TemplateField> {
        self.fields().find(|f| f.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// BCP 47 language tag of the rendered letter
    #[serde(default = "default_language")]
    pub language: String,
    /// Whether the wording was reviewed for legal compliance
    #[serde(default)]
    pub legal_compliance: bool,
    pub version: String,
}

fn default_language() -> String {
    "fr".to_string()
}

/// A named slot to be filled, matching `{{key}}` tokens in block content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    pub source: FieldSource,
    /// Regex the value must match when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Allowed values for `select` fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Date,
    Number,
    Email,
    Phone,
    Address,
    Iban,
    PostalCode,
    Select,
}

/// Where a field value comes from.
///
/// Profile lookups always carry their path and calculated fields always carry
/// their rule, so a definition without them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSource {
    UserProfile { path: String },
    ManualInput,
    ExtractedFromUpload,
    Calculated { rule: CalculationRule },
}

/// Deterministic rules for calculated fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationRule {
    /// December 31 of the following year (default insurance termination date)
    EndOfNextYear,
    /// The current date
    Today,
    /// Last day of the month, `months` months from now (notice periods)
    EndOfMonthAfter { months: u32 },
}

/// One renderable unit of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub block_type: BlockType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<BlockCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BlockStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Header,
    Paragraph,
    List,
    Signature,
    Footer,
    Address,
}

impl BlockType {
    pub fn css_class(&self) -> &'static str {
        match self {
            BlockType::Header => "header",
            BlockType::Paragraph => "paragraph",
            BlockType::List => "list",
            BlockType::Signature => "signature",
            BlockType::Footer => "footer",
            BlockType::Address => "address",
        }
    }
}

/// Guard deciding whether a block is rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCondition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "===")]
    Equals,
    #[serde(rename = "!==")]
    NotEquals,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    /// Substring for string fields, membership for array fields
    #[serde(rename = "includes")]
    Includes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    /// CSS font size, e.g. "12pt"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}
