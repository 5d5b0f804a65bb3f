//! Deterministic regex extraction from free text
//!
//! Conservative by construction: a key is only produced when the text states
//! the value explicitly.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use shared_types::FieldValues;

use crate::formatting::format_swiss_phone;
use crate::patterns::{
    contains_any, HEALTH_KEYWORDS, INSURANCE_BRANCH_KEYWORDS, TERMINATION_KEYWORDS,
};

lazy_static! {
    static ref NAME_PATTERN: Regex = Regex::new(
        r"(?:[Jj]e m['’]appelle|[Mm]on nom est)\s+(\p{Lu}[\p{L}'’-]+)\s+(\p{Lu}[\p{L}'’-]+)"
    )
    .unwrap();

    static ref REFERENCE_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:num[ée]ro|n°|police|contrat|r[ée]f[ée]rence|r[ée]f\.)\s*(?:de\s+(?:police|contrat|client)\s*)?[:#]?\s*([A-Z0-9][A-Z0-9./-]{2,})"
    )
    .unwrap();

    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();

    static ref PHONE_PATTERN: Regex = Regex::new(
        r"(?:\+41|0041)\s?(?:\(0\)\s?)?\d{2}(?:[\s.]?\d){7}\b|\b0\d{2}(?:[\s.]?\d){7}\b"
    )
    .unwrap();

    static ref DATE_PATTERN: Regex =
        Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4})\b").unwrap();

    /// Street-type word, a capitalized street name and a house number, with
    /// an optional NPA and locality
    static ref ADDRESS_PATTERN: Regex = Regex::new(
        r"\b((?i:rue|avenue|av\.|chemin|ch\.|route|rte|boulevard|bd|place|quai|impasse|allée|sentier|ruelle)\s+(?:(?:de|du|des|la|le|les|d['’]|l['’])\s*){0,3}\p{Lu}[\p{L}'’.-]*(?:\s+[\p{L}'’.-]+){0,3}?\s+\d{1,4}[a-z]?)\b(?:\s*,?\s*(?:CH-)?(\d{4})\s+(\p{Lu}[\p{L}-]+))?"
    )
    .unwrap();

    /// Lowercase street names are only trusted when an NPA and locality follow
    static ref ADDRESS_WITH_NPA_PATTERN: Regex = Regex::new(
        r"\b((?i:rue|avenue|av\.|chemin|ch\.|route|rte|boulevard|bd|place|quai|impasse|allée|sentier|ruelle)\s+[\p{L}'’ .-]+?\s+\d{1,4}[a-z]?)\s*,?\s*(?:CH-)?(\d{4})\s+(\p{Lu}[\p{L}-]+)"
    )
    .unwrap();

    static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"(?i)(?:\b(?:CHF|Fr\.|SFr\.)\s*(\d{1,3}(?:['’ ]\d{3})+|\d+)(?:[.,](\d{1,2}|-))?)|(?:\b(\d{1,3}(?:['’ ]\d{3})+|\d+)(?:[.,](\d{1,2}|-))?\s*(?:CHF|francs?\b|fr\.))"
    )
    .unwrap();

    static ref INSURER_PATTERN: Regex = Regex::new(
        r"\b[Aa]ssurance\s+(\p{Lu}[\p{L}&-]*(?:\s+\p{Lu}[\p{L}&-]*)?)"
    )
    .unwrap();
}

/// Extract well-known fields from a free-text request.
///
/// Keys produced: `prenom`, `nom`, `numero_police`, `email`, `telephone`,
/// `date` (ISO), `date_resiliation` (ISO, only when the text mentions a
/// termination), `adresse`, `npa`, `localite`, `montant`, `nom_assurance`.
///
/// Addresses are matched on a single line starting with a street-type word.
/// The street name must be capitalized unless a 4-digit NPA and a one-word
/// locality follow the house number.
pub fn extract_with_patterns(text: &str) -> FieldValues {
    let mut values = FieldValues::new();

    if let Some(caps) = NAME_PATTERN.captures(text) {
        insert(&mut values, "prenom", &caps[1]);
        insert(&mut values, "nom", &caps[2]);
    }

    let phone_spans: Vec<(usize, usize)> = PHONE_PATTERN
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    if let Some(reference) = REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|m| !phone_spans.iter().any(|&(s, e)| m.start() >= s && m.start() < e))
        .map(|m| m.as_str().trim_end_matches(['.', '-', '/']))
        .find(|candidate| candidate.chars().any(|c| c.is_ascii_digit()) && !is_date(candidate))
    {
        insert(&mut values, "numero_police", reference);
    }

    if let Some(m) = EMAIL_PATTERN.find(text) {
        insert(&mut values, "email", m.as_str());
    }

    if let Some(phone) = PHONE_PATTERN
        .find_iter(text)
        .find_map(|m| format_swiss_phone(m.as_str()))
    {
        insert(&mut values, "telephone", &phone);
    }

    if let Some(date) = DATE_PATTERN.captures_iter(text).find_map(|caps| {
        chrono::NaiveDate::from_ymd_opt(
            caps[3].parse().ok()?,
            caps[2].parse().ok()?,
            caps[1].parse().ok()?,
        )
    }) {
        let iso = date.format("%Y-%m-%d").to_string();
        if contains_any(&text.to_lowercase(), TERMINATION_KEYWORDS) {
            insert(&mut values, "date_resiliation", &iso);
        }
        insert(&mut values, "date", &iso);
    }

    if let Some(caps) = ADDRESS_PATTERN
        .captures(text)
        .or_else(|| ADDRESS_WITH_NPA_PATTERN.captures(text))
    {
        insert(&mut values, "adresse", caps[1].trim());
        if let (Some(npa), Some(localite)) = (caps.get(2), caps.get(3)) {
            insert(&mut values, "npa", npa.as_str());
            insert(&mut values, "localite", localite.as_str());
        }
    }

    if let Some(amount) = AMOUNT_PATTERN.captures_iter(text).find_map(|caps| {
        let whole = caps.get(1).or_else(|| caps.get(3))?;
        let cents = caps.get(2).or_else(|| caps.get(4)).map(|m| m.as_str());
        normalize_amount(whole.as_str(), cents)
    }) {
        insert(&mut values, "montant", &amount);
    }

    if let Some(insurer) = INSURER_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|name| !is_insurance_branch(name))
    {
        insert(&mut values, "nom_assurance", insurer);
    }

    values
}

fn insert(values: &mut FieldValues, key: &str, value: &str) {
    values.insert(key.to_string(), Value::String(value.to_string()));
}

/// "Maladie", "Accidents" and the like name a cover, not a company
fn is_insurance_branch(name: &str) -> bool {
    let first = name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    HEALTH_KEYWORDS.contains(&first.as_str())
        || INSURANCE_BRANCH_KEYWORDS.contains(&first.as_str())
}

fn is_date(candidate: &str) -> bool {
    DATE_PATTERN.is_match(candidate)
}

/// `1'234` + `50` → `1234.50`; `150` + `-` → `150.00`
fn normalize_amount(whole: &str, cents: Option<&str>) -> Option<String> {
    let digits: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    let whole: u64 = digits.parse().ok()?;
    let cents = match cents {
        None | Some("-") => 0,
        Some(c) if c.len() == 1 => c.parse::<u64>().ok()? * 10,
        Some(c) => c.parse().ok()?,
    };
    Some(format!("{}.{:02}", whole, cents))
}
