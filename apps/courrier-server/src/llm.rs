//! OpenAI chat-completions client used as classifier and extractor

use async_trait::async_trait;
use intake_engine::{ClassifierError, DataExtractor, ExtractorError, RequestClassifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{
    is_filled, Category, DocumentType, FieldValues, RoutingAnalysis, RoutingSource, TemplateField,
    Tone,
};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CLASSIFY_PROMPT: &str = "Tu analyses des demandes de courrier administratif en Suisse romande. \
Réponds uniquement avec un objet JSON contenant : document_type (resiliation, remboursement, \
reclamation, demande_administrative, lettre_formelle, attestation, facture), category (assurance, \
logement, finance, administratif, juridique, emploi), suggested_template (assurance-maladie, \
resiliation-bail, reclamation-generale, demande-remboursement, lettre-formelle), required_fields \
(liste de clés), tone (formal ou informal), language, confidence (entre 0 et 1) et reasoning.";

const EXTRACT_PROMPT: &str = "Tu extrais des informations d'une demande de courrier. \
Réponds uniquement avec un objet JSON dont les clés sont celles demandées et les valeurs des \
chaînes. N'invente rien : omets toute clé absente du texte.";

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Classifier reply before it becomes a [`RoutingAnalysis`]
#[derive(Deserialize)]
struct ClassifierReply {
    document_type: DocumentType,
    category: Category,
    suggested_template: String,
    #[serde(default)]
    required_fields: Vec<String>,
    #[serde(default)]
    tone: Tone,
    #[serde(default = "default_language")]
    language: String,
    confidence: f32,
    #[serde(default)]
    reasoning: String,
}

fn default_language() -> String {
    "fr".to_string()
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send one JSON-mode completion and return the message content
    async fn complete(&self, system: &str, user: String) -> Result<String, String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.0,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let body: ChatResponse = response.json().await.map_err(|e| e.to_string())?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| "empty completion".to_string())
    }
}

#[async_trait]
impl RequestClassifier for OpenAiClient {
    async fn classify(&self, text: &str) -> Result<RoutingAnalysis, ClassifierError> {
        let content = self
            .complete(CLASSIFY_PROMPT, text.to_string())
            .await
            .map_err(ClassifierError::Request)?;
        debug!(model = %self.model, "Classifier replied");
        parse_classifier_reply(&content)
    }
}

#[async_trait]
impl DataExtractor for OpenAiClient {
    async fn extract(
        &self,
        text: &str,
        fields: &[TemplateField],
    ) -> Result<FieldValues, ExtractorError> {
        if fields.is_empty() {
            return Ok(FieldValues::new());
        }
        let content = self
            .complete(EXTRACT_PROMPT, extraction_prompt(text, fields))
            .await
            .map_err(ExtractorError::Request)?;
        parse_extraction_reply(&content, fields)
    }
}

fn extraction_prompt(text: &str, fields: &[TemplateField]) -> String {
    let keys: Vec<String> = fields
        .iter()
        .map(|f| format!("- {} : {}", f.key, f.label))
        .collect();
    format!("Clés demandées :\n{}\n\nTexte :\n{}", keys.join("\n"), text)
}

pub fn parse_classifier_reply(content: &str) -> Result<RoutingAnalysis, ClassifierError> {
    let reply: ClassifierReply = serde_json::from_str(content)
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;
    if !(0.0..=1.0).contains(&reply.confidence) {
        return Err(ClassifierError::MalformedResponse(format!(
            "confidence out of range: {}",
            reply.confidence
        )));
    }
    Ok(RoutingAnalysis {
        document_type: reply.document_type,
        category: reply.category,
        suggested_template: reply.suggested_template,
        required_fields: reply.required_fields,
        tone: reply.tone,
        language: reply.language,
        confidence: reply.confidence,
        reasoning: reply.reasoning,
        source: RoutingSource::Classifier,
    })
}

/// Keep only requested keys with filled scalar values
pub fn parse_extraction_reply(
    content: &str,
    fields: &[TemplateField],
) -> Result<FieldValues, ExtractorError> {
    let reply: Value = serde_json::from_str(content)
        .map_err(|e| ExtractorError::MalformedResponse(e.to_string()))?;
    let Value::Object(map) = reply else {
        return Err(ExtractorError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .filter(|(key, value)| {
            fields.iter().any(|f| &f.key == key)
                && is_filled(value)
                && !matches!(value, Value::Object(_) | Value::Array(_))
        })
        .collect())
}
