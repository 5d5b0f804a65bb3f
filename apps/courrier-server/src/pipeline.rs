//! Document generation pipeline
//!
//! Single pass, no retries:
//! `Routing → FieldGathering → Validation → Assembly → Rendered | MissingData`

use chrono::{DateTime, Local, Utc};
use intake_engine::{fallback_analysis, format_field_value, gather_user_data_on};
use shared_types::{is_filled, FieldValues, RoutingAnalysis, Template};
use template_engine::{
    assemble_document_at, assembler::PDF_UNAVAILABLE_MESSAGE, render_document,
    validate_required_data, EngineError, OutputFormat, RenderedDocument,
};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Warning added when the external extractor failed
pub const EXTRACTION_DEGRADED_WARNING: &str =
    "Extraction automatique indisponible : seules les données reconnues localement ont été utilisées";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Routing,
    FieldGathering,
    Validation,
    Assembly,
    Rendered,
    MissingData,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Routing => "routing",
            PipelineStage::FieldGathering => "field_gathering",
            PipelineStage::Validation => "validation",
            PipelineStage::Assembly => "assembly",
            PipelineStage::Rendered => "rendered",
            PipelineStage::MissingData => "missing_data",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineRequest {
    /// Explicit template; routed from `user_input` when absent
    pub template_id: Option<String>,
    pub user_input: Option<String>,
    /// Values typed by the user; they override every other source
    pub manual_data: FieldValues,
    pub format: OutputFormat,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Rendered(RenderedDocument),
    MissingData {
        missing: Vec<String>,
        warnings: Vec<String>,
        draft_html: String,
    },
}

impl PipelineOutcome {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineOutcome::Rendered(_) => PipelineStage::Rendered,
            PipelineOutcome::MissingData { .. } => PipelineStage::MissingData,
        }
    }
}

/// Route free text to a loadable template.
///
/// A classifier suggestion naming an unknown template falls back to keyword
/// routing.
pub async fn route_request(
    state: &AppState,
    text: &str,
) -> Result<(RoutingAnalysis, Template), ApiError> {
    let analysis = state.router.analyze_request(text).await;
    match state.templates.load_template(&analysis.suggested_template) {
        Ok(template) => Ok((analysis, template)),
        Err(EngineError::TemplateNotFound(id)) if !analysis.is_degraded() => {
            warn!(template = %id, "Classifier suggested an unknown template, using keyword routing");
            let analysis = fallback_analysis(text);
            let template = state.templates.load_template(&analysis.suggested_template)?;
            Ok((analysis, template))
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the pipeline for an authenticated user
pub async fn run_pipeline(
    state: &AppState,
    user_id: &str,
    request: PipelineRequest,
    now: DateTime<Utc>,
) -> Result<PipelineOutcome, ApiError> {
    if !request.format.is_supported() {
        return Err(ApiError::PdfNotAvailable(PDF_UNAVAILABLE_MESSAGE.to_string()));
    }

    debug!(stage = %PipelineStage::Routing, user = %user_id);
    let user_input = request.user_input.as_deref().filter(|t| !t.trim().is_empty());
    let template = match (&request.template_id, user_input) {
        (Some(id), _) => state.templates.load_template(id)?,
        (None, Some(text)) => route_request(state, text).await?.1,
        (None, None) => {
            return Err(ApiError::InvalidRequest(
                "templateId or userInput is required".to_string(),
            ))
        }
    };

    debug!(stage = %PipelineStage::FieldGathering, template = %template.id);
    let today = now.with_timezone(&Local).date_naive();
    let gathered = gather_user_data_on(
        state.users.as_ref(),
        user_id,
        &template.required_fields,
        &template.optional_fields,
        today,
    )
    .await?;

    let mut data = gathered.available_fields.clone();
    let mut extraction_degraded = false;
    if let Some(text) = user_input {
        let fields: Vec<_> = template.fields().cloned().collect();
        let outcome = state.extractor.extract_data_combined(text, &fields).await;
        extraction_degraded = outcome.degraded;
        merge_declared(&template, &mut data, outcome.values, Merge::FillGaps);
    }
    merge_declared(&template, &mut data, request.manual_data, Merge::Override);

    debug!(stage = %PipelineStage::Validation, template = %template.id);
    let report = validate_required_data(&data, &template.required_fields);

    debug!(stage = %PipelineStage::Assembly, template = %template.id, valid = report.valid);
    if !report.valid {
        let mut warnings: Vec<String> = gathered
            .missing_fields
            .iter()
            .filter(|key| !data.get(key.as_str()).is_some_and(is_filled))
            .filter_map(|key| gathered.warning_for(key))
            .map(str::to_string)
            .collect();
        if extraction_degraded {
            warnings.push(EXTRACTION_DEGRADED_WARNING.to_string());
        }

        info!(
            template = %template.id,
            missing = report.missing.len(),
            "Document incomplete, returning draft"
        );
        return Ok(PipelineOutcome::MissingData {
            missing: report.missing,
            warnings,
            draft_html: assemble_document_at(&template, &data, now),
        });
    }

    let document = render_document(&template, &data, request.format, now)?;
    info!(template = %template.id, filename = %document.filename, "Document rendered");
    Ok(PipelineOutcome::Rendered(document))
}

/// How a value source combines with what is already gathered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    /// Only keys that are still empty; extraction never replaces profile data
    FillGaps,
    /// Every filled value wins
    Override,
}

/// Overlay filled values for fields the template declares, formatted by type
fn merge_declared(template: &Template, data: &mut FieldValues, values: FieldValues, mode: Merge) {
    for (key, value) in values {
        if !is_filled(&value) {
            continue;
        }
        if mode == Merge::FillGaps && data.get(&key).is_some_and(is_filled) {
            debug!(key = %key, "Keeping gathered value over extracted one");
            continue;
        }
        match template.field(&key) {
            Some(field) => {
                let formatted = format_field_value(field.field_type, &value);
                data.insert(key, formatted);
            }
            None => debug!(key = %key, "Ignoring value for undeclared field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use template_engine::load_template;

    fn values(pairs: &[(&str, serde_json::Value)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_extracted_values_keep_profile_data() {
        let template = load_template("assurance-maladie").unwrap();
        let mut data = values(&[("nom_assurance", json!("Helsana Assurances SA"))]);

        merge_declared(
            &template,
            &mut data,
            values(&[
                ("nom_assurance", json!("Maladie")),
                ("numero_police", json!("987654")),
            ]),
            Merge::FillGaps,
        );

        assert_eq!(data["nom_assurance"], json!("Helsana Assurances SA"));
        assert_eq!(data["numero_police"], json!("987654"));
    }

    #[test]
    fn test_manual_values_override() {
        let template = load_template("assurance-maladie").unwrap();
        let mut data = values(&[("nom_assurance", json!("Helsana Assurances SA"))]);

        merge_declared(
            &template,
            &mut data,
            values(&[
                ("nom_assurance", json!("CSS Assurance")),
                ("inconnu", json!("x")),
                ("motif", json!("")),
            ]),
            Merge::Override,
        );

        assert_eq!(data["nom_assurance"], json!("CSS Assurance"));
        assert!(!data.contains_key("inconnu"));
        assert!(!data.contains_key("motif"));
    }

    #[test]
    fn test_select_option_becomes_boolean() {
        let template = load_template("reclamation-generale").unwrap();
        let mut data = FieldValues::new();

        merge_declared(
            &template,
            &mut data,
            values(&[("has_urgent", json!("true"))]),
            Merge::Override,
        );

        assert_eq!(data["has_urgent"], json!(true));
    }
}
