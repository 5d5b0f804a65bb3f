//! Swiss (fr-CH) presentation of dates, phone numbers and postal codes

use chrono::NaiveDate;
use serde_json::Value;
use shared_types::FieldType;

const SWISS_DATE_FORMAT: &str = "%d.%m.%Y";

/// Format a date as `DD.MM.YYYY`
pub fn format_swiss_date(date: NaiveDate) -> String {
    date.format(SWISS_DATE_FORMAT).to_string()
}

/// Parse `D.M.YYYY`, `D/M/YYYY`, `D-M-YYYY` or ISO `YYYY-MM-DD`.
///
/// Returns `None` for anything that is not a real calendar date.
pub fn parse_swiss_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    let parts: Vec<&str> = text.split(['.', '/', '-']).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    if year.len() != 4 || day.is_empty() || day.len() > 2 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Format a Swiss phone number.
///
/// National numbers become `0XX XXX XX XX`; numbers with a `+41`/`0041`
/// prefix become `+41 XX XXX XX XX`. Anything else yields `None`.
pub fn format_swiss_phone(text: &str) -> Option<String> {
    let compact: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '/' | '(' | ')'))
        .collect();

    let (international, national) = if let Some(rest) = compact.strip_prefix("+41") {
        (true, rest.trim_start_matches('0'))
    } else if let Some(rest) = compact.strip_prefix("0041") {
        (true, rest.trim_start_matches('0'))
    } else if let Some(rest) = compact.strip_prefix('0') {
        (false, rest)
    } else {
        return None;
    };

    if national.len() != 9 || !national.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let grouped = format!(
        "{} {} {} {}",
        &national[0..2],
        &national[2..5],
        &national[5..7],
        &national[7..9]
    );
    Some(if international {
        format!("+41 {}", grouped)
    } else {
        format!("0{}", grouped)
    })
}

/// Left-pad a postal code (NPA) to 4 digits. Accepts numbers, digit strings
/// and a `CH-` prefix.
pub fn format_postal_code(value: &Value) -> Option<String> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?.to_string(),
        Value::String(s) => s.trim().trim_start_matches("CH-").trim().to_string(),
        _ => return None,
    };
    if raw.is_empty() || raw.len() > 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{:0>4}", raw))
}

/// Present a raw value according to its field type.
///
/// Select options `"true"` and `"false"` become booleans so block guards can
/// compare them. Dates, phones and postal codes that cannot be normalized are
/// returned unchanged.
pub fn format_field_value(field_type: FieldType, value: &Value) -> Value {
    let formatted = match (field_type, value) {
        (FieldType::Date, Value::String(s)) => {
            parse_swiss_date(s).map(|d| Value::String(format_swiss_date(d)))
        }
        (FieldType::Phone, Value::String(s)) => format_swiss_phone(s).map(Value::String),
        (FieldType::PostalCode, _) => format_postal_code(value).map(Value::String),
        (FieldType::Select, Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    formatted.unwrap_or_else(|| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_format_swiss_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(format_swiss_date(date), "05.03.2026");
    }

    #[test]
    fn test_parse_swiss_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 5);
        assert_eq!(parse_swiss_date("05.03.2026"), expected);
        assert_eq!(parse_swiss_date("5.3.2026"), expected);
        assert_eq!(parse_swiss_date("5/3/2026"), expected);
        assert_eq!(parse_swiss_date("05-03-2026"), expected);
        assert_eq!(parse_swiss_date("2026-03-05"), expected);
    }

    #[test]
    fn test_parse_rejects_invalid_dates() {
        assert_eq!(parse_swiss_date("31.02.2026"), None);
        assert_eq!(parse_swiss_date("12.13.2026"), None);
        assert_eq!(parse_swiss_date("1.1.26"), None);
        assert_eq!(parse_swiss_date("demain"), None);
        assert_eq!(parse_swiss_date(""), None);
    }

    #[test]
    fn test_format_national_phone() {
        assert_eq!(format_swiss_phone("0791234567").as_deref(), Some("079 123 45 67"));
        assert_eq!(format_swiss_phone("079 123 45 67").as_deref(), Some("079 123 45 67"));
        assert_eq!(format_swiss_phone("021.345.67.89").as_deref(), Some("021 345 67 89"));
    }

    #[test]
    fn test_format_international_phone() {
        assert_eq!(format_swiss_phone("+41791234567").as_deref(), Some("+41 79 123 45 67"));
        assert_eq!(format_swiss_phone("0041 79 123 45 67").as_deref(), Some("+41 79 123 45 67"));
        assert_eq!(format_swiss_phone("+41 (0)79 123 45 67").as_deref(), Some("+41 79 123 45 67"));
    }

    #[test]
    fn test_format_phone_rejects_other_numbers() {
        assert_eq!(format_swiss_phone("123456"), None);
        assert_eq!(format_swiss_phone("+33 6 12 34 56 78"), None);
        assert_eq!(format_swiss_phone("07912345678"), None);
    }

    #[test]
    fn test_format_postal_code() {
        assert_eq!(format_postal_code(&json!(1003)).as_deref(), Some("1003"));
        assert_eq!(format_postal_code(&json!(950)).as_deref(), Some("0950"));
        assert_eq!(format_postal_code(&json!("CH-1204")).as_deref(), Some("1204"));
        assert_eq!(format_postal_code(&json!("12345")), None);
        assert_eq!(format_postal_code(&json!("Lausanne")), None);
    }

    #[test]
    fn test_format_field_value() {
        assert_eq!(
            format_field_value(FieldType::Date, &json!("1985-04-12")),
            json!("12.04.1985")
        );
        assert_eq!(
            format_field_value(FieldType::Phone, &json!("0791234567")),
            json!("079 123 45 67")
        );
        assert_eq!(format_field_value(FieldType::PostalCode, &json!(1003)), json!("1003"));
        assert_eq!(format_field_value(FieldType::Date, &json!("bientôt")), json!("bientôt"));
        assert_eq!(format_field_value(FieldType::Text, &json!("Jean")), json!("Jean"));
    }

    #[test]
    fn test_boolean_select_options() {
        assert_eq!(format_field_value(FieldType::Select, &json!("true")), json!(true));
        assert_eq!(format_field_value(FieldType::Select, &json!("false")), json!(false));
        assert_eq!(format_field_value(FieldType::Select, &json!(true)), json!(true));
        assert_eq!(format_field_value(FieldType::Select, &json!("mensuel")), json!("mensuel"));
        assert_eq!(format_field_value(FieldType::Text, &json!("true")), json!("true"));
    }
}
