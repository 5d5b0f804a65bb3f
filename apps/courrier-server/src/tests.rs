//! Tests for the Courrier server API
//!
//! Test categories:
//! - Classifier reply parsing against arbitrary input
//! - HTTP endpoints driven through `axum_test::TestServer`
//! - Middleware stack construction

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::llm::{parse_classifier_reply, parse_extraction_reply};
    use shared_types::{FieldSource, FieldType, TemplateField};
    use template_engine::list_templates;

    fn known_template_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("assurance-maladie".to_string()),
            Just("resiliation-bail".to_string()),
            Just("reclamation-generale".to_string()),
            Just("demande-remboursement".to_string()),
            Just("lettre-formelle".to_string()),
        ]
    }

    fn manual_field(key: &str) -> TemplateField {
        TemplateField {
            key: key.to_string(),
            label: key.to_string(),
            field_type: FieldType::Text,
            required: false,
            source: FieldSource::ManualInput,
            validation: None,
            default_value: None,
            options: Vec::new(),
        }
    }

    proptest! {
        #[test]
        fn known_ids_are_listed(id in known_template_id()) {
            prop_assert!(list_templates().iter().any(|t| t.id == id));
        }

        #[test]
        fn classifier_reply_never_panics(content in ".{0,200}") {
            let _ = parse_classifier_reply(&content);
        }

        #[test]
        fn classifier_confidence_bounds(confidence in -2.0f32..3.0) {
            let content = format!(
                r#"{{"document_type":"resiliation","category":"assurance","suggested_template":"assurance-maladie","confidence":{}}}"#,
                confidence
            );
            let result = parse_classifier_reply(&content);
            prop_assert_eq!(result.is_ok(), (0.0..=1.0).contains(&confidence));
        }

        #[test]
        fn extraction_reply_only_keeps_requested_keys(
            key in "[a-z_]{1,12}",
            value in "[A-Za-z0-9 ]{1,20}",
        ) {
            let content = serde_json::json!({ key.clone(): value }).to_string();
            let values = parse_extraction_reply(&content, &[manual_field("nom")]).unwrap();
            prop_assert!(values.keys().all(|k| k == "nom"));
            if key != "nom" {
                prop_assert!(values.is_empty());
            }
        }
    }
}

#[cfg(test)]
mod http_endpoint_tests {
    use std::sync::Arc;

    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use intake_engine::{CombinedExtractor, RequestRouter};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use template_engine::templates::EmbeddedTemplates;

    use crate::sessions::{InMemorySessionStore, SessionStore};
    use crate::state::AppState;
    use crate::users::JsonUserDirectory;

    const JEAN: &str = "Bearer demo-jean-dupont";
    const MARIE: &str = "Bearer demo-marie-favre";

    async fn create_test_server() -> TestServer {
        let directory = JsonUserDirectory::from_json(include_str!("../fixtures/users.json"))
            .expect("fixture parses");
        let sessions = InMemorySessionStore::new(chrono::Duration::hours(1));
        for session in directory.seed_sessions() {
            sessions.restore(session).await;
        }

        let state = AppState {
            templates: Arc::new(EmbeddedTemplates),
            router: RequestRouter::fallback_only(),
            extractor: CombinedExtractor::regex_only(),
            users: Arc::new(directory),
            sessions: Arc::new(sessions),
        };

        // Governor needs connect info, so the bare routes are served here
        TestServer::new(crate::routes(state)).unwrap()
    }

    fn bearer(token: &'static str) -> HeaderValue {
        HeaderValue::from_static(token)
    }

    #[tokio::test]
    async fn test_health() {
        let server = create_test_server().await;
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "courrier-server");
    }

    #[tokio::test]
    async fn test_list_templates() {
        let server = create_test_server().await;
        let response = server.get("/api/templates").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 5);
        assert_eq!(json["templates"][0]["id"], "assurance-maladie");
        assert_eq!(json["templates"][0]["category"], "assurance");
    }

    #[tokio::test]
    async fn test_get_template() {
        let server = create_test_server().await;
        let response = server.get("/api/templates/resiliation-bail").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["template"]["id"], "resiliation-bail");
        assert_eq!(json["template"]["document_type"], "resiliation");
    }

    #[tokio::test]
    async fn test_get_unknown_template() {
        let server = create_test_server().await;
        let response = server.get("/api/templates/inexistant").await;
        response.assert_status_not_found();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "TEMPLATE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analyze_routes_health_insurance() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/analyze")
            .json(&json!({
                "userInput": "Je veux résilier mon assurance maladie, police n° 987654"
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["analysis"]["suggested_template"], "assurance-maladie");
        assert_eq!(json["analysis"]["confidence"], 0.7);
        assert_eq!(json["template"]["id"], "assurance-maladie");
        assert_eq!(json["extractedData"]["numero_police"], "987654");
        assert_eq!(json["extractionDegraded"], false);
    }

    #[tokio::test]
    async fn test_analyze_rejects_empty_input() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/analyze")
            .json(&json!({ "userInput": "   " }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_generate_requires_session() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .json(&json!({ "templateId": "lettre-formelle" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer("Bearer inconnu"))
            .json(&json!({ "templateId": "lettre-formelle" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_generate_missing_data_returns_draft() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(MARIE))
            .json(&json!({ "templateId": "lettre-formelle" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "MISSING_DATA");
        let missing: Vec<&str> = json["missing"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(missing.contains(&"Destinataire"));
        assert!(missing.contains(&"Texte de la lettre"));
        assert!(!missing.contains(&"Nom"));

        let draft = json["draftHtml"].as_str().unwrap();
        assert!(draft.contains("[DESTINATAIRE]"));
        assert!(draft.contains("Favre"));
    }

    #[tokio::test]
    async fn test_generate_health_insurance_termination() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "assurance-maladie" }))
            .await;
        response.assert_status_ok();

        let content_type = response.header(header::CONTENT_TYPE);
        assert!(content_type.to_str().unwrap().starts_with("text/html"));

        let disposition = response.header(header::CONTENT_DISPOSITION);
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"assurance-maladie-"));
        assert!(disposition.ends_with(".html\""));

        let body = response.text();
        assert!(body.contains("Helsana Assurances SA"));
        assert!(body.contains("123456"));
        assert!(!body.contains("{{"));
    }

    #[tokio::test]
    async fn test_generate_routes_from_user_input() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({
                "userInput": "Bonjour, je souhaite résilier mon assurance maladie"
            }))
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("Dupont"));
    }

    #[tokio::test]
    async fn test_generate_keeps_profile_insurer() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "userInput": "Je veux résilier mon Assurance Maladie" }))
            .await;
        response.assert_status_ok();

        let body = response.text();
        assert!(body.contains("Helsana Assurances SA"));
        assert!(!body.contains("Maladie<br>"));
    }

    #[tokio::test]
    async fn test_generate_without_template_or_input() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({}))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_generate_urgent_complaint() {
        let server = create_test_server().await;
        let manual = json!({
            "destinataire": "Swisscom SA",
            "adresse_destinataire": "Alte Tiefenaustrasse 6, 3048 Worblaufen",
            "objet": "Facture erronée",
            "description": "Ma facture de mars comporte des frais déjà payés."
        });

        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "reclamation-generale", "manualData": manual }))
            .await;
        response.assert_status_ok();
        assert!(!response.text().contains("URGENT"));

        let mut urgent = manual.clone();
        urgent["has_urgent"] = json!(true);
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "reclamation-generale", "manualData": urgent }))
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("URGENT"));

        // The declared select options are strings
        let mut option = manual.clone();
        option["has_urgent"] = json!("true");
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "reclamation-generale", "manualData": option }))
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("URGENT"));

        option["has_urgent"] = json!("false");
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "reclamation-generale", "manualData": option }))
            .await;
        response.assert_status_ok();
        assert!(!response.text().contains("URGENT"));
    }

    #[tokio::test]
    async fn test_generate_pdf_not_available() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "assurance-maladie", "format": "pdf" }))
            .await;
        response.assert_status(StatusCode::NOT_IMPLEMENTED);

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "PDF_NOT_AVAILABLE");
    }

    #[tokio::test]
    async fn test_generate_unknown_format() {
        let server = create_test_server().await;
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .json(&json!({ "templateId": "assurance-maladie", "format": "docx" }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_open_session() {
        let server = create_test_server().await;
        let response = server
            .post("/api/sessions")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .await;
        response.assert_status(StatusCode::CREATED);

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["userId"], "jean-dupont");
        assert!(json["expiresAt"].is_string());
        let token = json["token"].as_str().unwrap().to_string();
        assert_ne!(token, "demo-jean-dupont");

        let auth = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();
        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, auth.clone())
            .json(&json!({ "templateId": "assurance-maladie" }))
            .await;
        response.assert_status_ok();

        let response = server
            .delete("/api/sessions/current")
            .add_header(header::AUTHORIZATION, auth.clone())
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, auth)
            .json(&json!({ "templateId": "assurance-maladie" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // The credential it was exchanged for stays valid
        let response = server
            .post("/api/sessions")
            .add_header(header::AUTHORIZATION, bearer(JEAN))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_open_session_requires_token() {
        let server = create_test_server().await;
        let response = server.post("/api/sessions").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_expires_session() {
        let server = create_test_server().await;
        let response = server
            .delete("/api/sessions/current")
            .add_header(header::AUTHORIZATION, bearer(MARIE))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .post("/api/documents/generate")
            .add_header(header::AUTHORIZATION, bearer(MARIE))
            .json(&json!({ "templateId": "lettre-formelle" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[cfg(test)]
mod middleware_tests {
    use axum::{routing::get, Router};

    #[test]
    fn test_middleware_stack_builds() {
        let router = Router::new().route("/health", get(crate::api::handle_health));
        assert!(crate::with_middleware(router, 10).is_ok());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        assert!(crate::with_middleware(Router::new(), 0).is_err());
    }
}
