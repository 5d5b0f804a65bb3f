//! Field gathering from the user-data provider

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use shared_types::{
    is_filled, CoreError, FieldSource, GatheredData, TemplateField, DATE_ENVOI,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calendar::apply_rule;
use crate::formatting::{format_field_value, format_swiss_date};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("User data provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed user record: {0}")]
    Malformed(String),
}

/// Source of user profile records
#[async_trait]
pub trait UserDataProvider: Send + Sync {
    /// The profile document for `user_id`, or `None` if the user is unknown
    async fn get_user_record(&self, user_id: &str) -> Result<Option<Value>, ProviderError>;
}

/// Gather field values for a user, dated today
pub async fn gather_user_data(
    provider: &dyn UserDataProvider,
    user_id: &str,
    required: &[TemplateField],
    optional: &[TemplateField],
) -> Result<GatheredData, CoreError> {
    let today = chrono::Local::now().date_naive();
    gather_user_data_on(provider, user_id, required, optional, today).await
}

/// Gather field values for a user as of `today`.
///
/// Fails only when the provider itself fails. Manual and upload fields are
/// left to the caller apart from their declared defaults. `date_envoi` is
/// always set.
pub async fn gather_user_data_on(
    provider: &dyn UserDataProvider,
    user_id: &str,
    required: &[TemplateField],
    optional: &[TemplateField],
    today: NaiveDate,
) -> Result<GatheredData, CoreError> {
    let record = provider
        .get_user_record(user_id)
        .await
        .map_err(|e| CoreError::DataSource(e.to_string()))?;

    if record.is_none() {
        debug!(user = %user_id, "No profile for user, profile fields will be missing");
    }

    let mut gathered = GatheredData::default();
    let fields = required
        .iter()
        .map(|f| (f, true))
        .chain(optional.iter().map(|f| (f, false)));

    for (field, is_required) in fields {
        let resolved = match &field.source {
            FieldSource::ManualInput | FieldSource::ExtractedFromUpload => {
                default_value(field)
            }
            FieldSource::Calculated { rule } => match apply_rule(*rule, today) {
                Some(date) => Some(Value::String(format_swiss_date(date))),
                None => {
                    warn!(field = %field.key, "Calculated date out of range");
                    default_value(field)
                }
            },
            FieldSource::UserProfile { path } => record
                .as_ref()
                .and_then(|r| lookup_path(r, path))
                .filter(|v| is_filled(v))
                .map(|v| format_field_value(field.field_type, v))
                .or_else(|| default_value(field)),
        };

        match resolved {
            Some(value) => gathered.insert(field.key.clone(), value),
            None if is_required && requires_gathering(&field.source) => gathered.mark_missing(
                field.key.clone(),
                format!("Champ requis manquant : {}", field.label),
            ),
            None => {}
        }
    }

    gathered.insert(DATE_ENVOI, Value::String(format_swiss_date(today)));

    info!(
        user = %user_id,
        available = gathered.available_fields.len(),
        missing = gathered.missing_fields.len(),
        "Gathered user data"
    );
    Ok(gathered)
}

/// Follow a dotted path (`adresse.npa`, `enfants.0.prenom`) into a record
pub fn lookup_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn default_value(field: &TemplateField) -> Option<Value> {
    field
        .default_value
        .as_ref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| Value::String(d.clone()))
}

/// Manual and upload fields are collected by the caller, not reported here
fn requires_gathering(source: &FieldSource) -> bool {
    matches!(
        source,
        FieldSource::UserProfile { .. } | FieldSource::Calculated { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shared_types::{CalculationRule, FieldType};
    use std::collections::HashMap;

    struct MemoryProvider(HashMap<String, Value>);

    #[async_trait]
    impl UserDataProvider for MemoryProvider {
        async fn get_user_record(&self, user_id: &str) -> Result<Option<Value>, ProviderError> {
            Ok(self.0.get(user_id).cloned())
        }
    }

    struct DownProvider;

    #[async_trait]
    impl UserDataProvider for DownProvider {
        async fn get_user_record(&self, _user_id: &str) -> Result<Option<Value>, ProviderError> {
            Err(ProviderError::Unavailable("connexion refusée".to_string()))
        }
    }

    fn field(key: &str, label: &str, field_type: FieldType, source: FieldSource) -> TemplateField {
        TemplateField {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
            required: true,
            source,
            validation: None,
            default_value: None,
            options: Vec::new(),
        }
    }

    fn profile(key: &str, label: &str, field_type: FieldType, path: &str) -> TemplateField {
        field(
            key,
            label,
            field_type,
            FieldSource::UserProfile {
                path: path.to_string(),
            },
        )
    }

    fn provider() -> MemoryProvider {
        MemoryProvider(HashMap::from([(
            "u1".to_string(),
            json!({
                "profil": {
                    "prenom": "Jean",
                    "nom": "Dupont",
                    "date_naissance": "1985-04-12",
                    "telephone": "+41791234567",
                    "email": ""
                },
                "adresse": { "rue": "Rue du Lac 12", "npa": 950, "localite": "Lausanne" }
            }),
        )]))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn test_profile_fields_are_formatted() {
        let required = vec![
            profile("prenom", "Prénom", FieldType::Text, "profil.prenom"),
            profile("npa", "NPA", FieldType::PostalCode, "adresse.npa"),
        ];
        let optional = vec![
            profile("date_naissance", "Date de naissance", FieldType::Date, "profil.date_naissance"),
            profile("telephone", "Téléphone", FieldType::Phone, "profil.telephone"),
        ];

        let data = gather_user_data_on(&provider(), "u1", &required, &optional, today())
            .await
            .unwrap();

        assert_eq!(data.available_fields["prenom"], json!("Jean"));
        assert_eq!(data.available_fields["npa"], json!("0950"));
        assert_eq!(data.available_fields["date_naissance"], json!("12.04.1985"));
        assert_eq!(data.available_fields["telephone"], json!("+41 79 123 45 67"));
        assert_eq!(data.available_fields[DATE_ENVOI], json!("15.03.2026"));
        assert!(data.missing_fields.is_empty());
        assert!(data.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_field_warns() {
        let required = vec![
            profile("nom", "Nom", FieldType::Text, "profil.nom"),
            profile("numero_police", "Numéro de police", FieldType::Text, "assurances.maladie.numero_police"),
            profile("email", "E-mail", FieldType::Email, "profil.email"),
        ];

        let data = gather_user_data_on(&provider(), "u1", &required, &[], today())
            .await
            .unwrap();

        assert_eq!(data.missing_fields, vec!["numero_police", "email"]);
        assert_eq!(
            data.warnings,
            vec![
                "Champ requis manquant : Numéro de police",
                "Champ requis manquant : E-mail"
            ]
        );
    }

    #[tokio::test]
    async fn test_optional_fields_are_never_missing() {
        let optional = vec![profile("iban", "IBAN", FieldType::Iban, "banque.iban")];
        let data = gather_user_data_on(&provider(), "u1", &[], &optional, today())
            .await
            .unwrap();
        assert!(data.missing_fields.is_empty());
        assert!(!data.available_fields.contains_key("iban"));
    }

    #[tokio::test]
    async fn test_calculated_fields() {
        let required = vec![
            field(
                "date_resiliation",
                "Date de résiliation",
                FieldType::Date,
                FieldSource::Calculated {
                    rule: CalculationRule::EndOfNextYear,
                },
            ),
            field(
                "fin_bail",
                "Fin du bail",
                FieldType::Date,
                FieldSource::Calculated {
                    rule: CalculationRule::EndOfMonthAfter { months: 3 },
                },
            ),
        ];
        let data = gather_user_data_on(&provider(), "u1", &required, &[], today())
            .await
            .unwrap();
        assert_eq!(data.available_fields["date_resiliation"], json!("31.12.2027"));
        assert_eq!(data.available_fields["fin_bail"], json!("30.06.2026"));
    }

    #[tokio::test]
    async fn test_manual_fields_use_defaults_only() {
        let mut delai = field("delai_reponse", "Délai", FieldType::Number, FieldSource::ManualInput);
        delai.required = false;
        delai.default_value = Some("30".to_string());
        let objet = field("objet", "Objet", FieldType::Text, FieldSource::ManualInput);

        let data = gather_user_data_on(&provider(), "u1", &[objet], &[delai], today())
            .await
            .unwrap();
        assert_eq!(data.available_fields["delai_reponse"], json!("30"));
        assert!(!data.available_fields.contains_key("objet"));
        assert!(data.missing_fields.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_reports_profile_fields_missing() {
        let required = vec![profile("nom", "Nom", FieldType::Text, "profil.nom")];
        let data = gather_user_data_on(&provider(), "inconnu", &required, &[], today())
            .await
            .unwrap();
        assert_eq!(data.missing_fields, vec!["nom"]);
        assert!(data.available_fields.contains_key(DATE_ENVOI));
    }

    #[tokio::test]
    async fn test_provider_failure_is_data_source_error() {
        let result = gather_user_data_on(&DownProvider, "u1", &[], &[], today()).await;
        match result {
            Err(CoreError::DataSource(msg)) => assert!(msg.contains("connexion refusée")),
            other => panic!("expected DataSource error, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_path() {
        let record = json!({ "a": { "b": [ { "c": 1 } ] } });
        assert_eq!(lookup_path(&record, "a.b.0.c"), Some(&json!(1)));
        assert_eq!(lookup_path(&record, "a.x"), None);
        assert_eq!(lookup_path(&record, "a.b.c"), None);
    }
}
