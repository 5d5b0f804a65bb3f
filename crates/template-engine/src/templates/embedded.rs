//! Embedded template loader
//!
//! Template definitions are JSON files under `templates/`, embedded into the
//! binary at compile time.

/// Health insurance termination - loaded from templates/assurance-maladie.json
const ASSURANCE_MALADIE_TEMPLATE: &str = include_str!("../../templates/assurance-maladie.json");

/// Lease termination - loaded from templates/resiliation-bail.json
const RESILIATION_BAIL_TEMPLATE: &str = include_str!("../../templates/resiliation-bail.json");

/// General complaint - loaded from templates/reclamation-generale.json
const RECLAMATION_GENERALE_TEMPLATE: &str =
    include_str!("../../templates/reclamation-generale.json");

/// Generic formal letter - loaded from templates/lettre-formelle.json
const LETTRE_FORMELLE_TEMPLATE: &str = include_str!("../../templates/lettre-formelle.json");

/// Refund request - loaded from templates/demande-remboursement.json
const DEMANDE_REMBOURSEMENT_TEMPLATE: &str =
    include_str!("../../templates/demande-remboursement.json");

/// Identifiers of every embedded template, in listing order
pub const EMBEDDED_TEMPLATE_IDS: &[&str] = &[
    "assurance-maladie",
    "resiliation-bail",
    "reclamation-generale",
    "demande-remboursement",
    "lettre-formelle",
];

/// Get an embedded template definition by id
pub fn get_embedded_template(id: &str) -> Option<&'static str> {
    match id {
        "assurance-maladie" => Some(ASSURANCE_MALADIE_TEMPLATE),
        "resiliation-bail" => Some(RESILIATION_BAIL_TEMPLATE),
        "reclamation-generale" => Some(RECLAMATION_GENERALE_TEMPLATE),
        "lettre-formelle" => Some(LETTRE_FORMELLE_TEMPLATE),
        "demande-remboursement" => Some(DEMANDE_REMBOURSEMENT_TEMPLATE),
        _ => None,
    }
}
