//! Keyword lists for routing free-text requests
//!
//! All lists are lowercase. Accented and unaccented spellings are both listed
//! since users type either.

/// Termination/cancellation keywords
pub const TERMINATION_KEYWORDS: &[&str] = &[
    "résilier",
    "resilier",
    "résiliation",
    "resiliation",
    "résilie",
    "resilie",
    "annuler",
    "annulation",
    "mettre fin",
    "dénoncer",
    "denoncer",
    "résiliant",
];

/// Insurance keywords
pub const INSURANCE_KEYWORDS: &[&str] = &[
    "assurance",
    "assureur",
    "caisse maladie",
    "caisse-maladie",
    "lamal",
    "police d'assurance",
];

/// Health keywords, combined with insurance keywords
pub const HEALTH_KEYWORDS: &[&str] = &[
    "maladie",
    "santé",
    "sante",
    "lamal",
    "complémentaire",
    "complementaire",
    "médecin",
    "medecin",
];

/// Insurance branches; a word from this list after "assurance" names a
/// kind of cover, not an insurer
pub const INSURANCE_BRANCH_KEYWORDS: &[&str] = &[
    "accident",
    "accidents",
    "ménage",
    "menage",
    "vie",
    "voyage",
    "auto",
    "véhicule",
    "vehicule",
    "responsabilité",
    "responsabilite",
    "rc",
    "protection",
    "juridique",
    "dentaire",
    "obligatoire",
    "base",
    "invalidité",
    "invalidite",
    "chômage",
    "chomage",
    "incendie",
    "bâtiment",
    "batiment",
    "habitation",
];

/// Housing and lease keywords
pub const HOUSING_KEYWORDS: &[&str] = &[
    "bail",
    "appartement",
    "logement",
    "loyer",
    "location",
    "régie",
    "regie",
    "bailleur",
    "propriétaire",
    "proprietaire",
];

/// Complaint keywords
pub const COMPLAINT_KEYWORDS: &[&str] = &[
    "réclamation",
    "reclamation",
    "réclamer",
    "reclamer",
    "plainte",
    "contester",
    "contestation",
    "litige",
    "mécontent",
    "mecontent",
    "insatisfait",
];

/// Street-type words that start a Swiss street address
pub const STREET_KEYWORDS: &[&str] = &[
    "rue",
    "avenue",
    "av.",
    "chemin",
    "ch.",
    "route",
    "rte",
    "boulevard",
    "bd",
    "place",
    "quai",
    "impasse",
    "allée",
    "sentier",
    "ruelle",
];

/// True if `text_lower` contains any of the keywords
pub fn contains_any(text_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text_lower.contains(k))
}

/// Keywords of `keywords` found in `text_lower`, in list order
pub fn matched_keywords<'a>(text_lower: &str, keywords: &[&'a str]) -> Vec<&'a str> {
    keywords
        .iter()
        .copied()
        .filter(|k| text_lower.contains(k))
        .collect()
}
