mod common;

use std::collections::HashMap;

use axum::http::Method;
use serde_json::json;

use common::MockProvider;
use formrelay::config::{FormsConfig, DEFAULT_TO_EMAIL};
use formrelay::error::{ErrorKind, RelayError};
use formrelay::form::Form;
use formrelay::submission::{normalize, SubmissionPayload};

fn payload() -> SubmissionPayload {
    let form = Form::new()
        .with_marker("contact")
        .with_field("name", " Ada ")
        .with_field("email", "ada@example.org")
        .with_field("message", "Hello");
    normalize(&form, "/contact.html")
}

// ── Google Sheets ───────────────────────────────────────────────

#[tokio::test]
async fn sheets_posts_payload_as_is() {
    let mock = MockProvider::start(200).await;
    let relay = common::relay(common::sheets_config(&mock.url("/macros/s/abc/exec")));
    let payload = payload();

    relay.dispatch(&payload).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/macros/s/abc/exec");
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].body, serde_json::to_value(&payload).unwrap());
}

#[tokio::test]
async fn unset_provider_defaults_to_sheets() {
    let mock = MockProvider::start(200).await;
    let mut forms = common::sheets_config(&mock.url("/exec"));
    forms.provider = None;

    common::relay(forms).dispatch(&payload()).await.unwrap();

    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.last_body()["name"], "Ada");
}

#[tokio::test]
async fn sheets_without_endpoint_is_a_config_error() {
    let mock = MockProvider::start(200).await;
    // Other providers point at the mock so any stray request would show up.
    let mut forms = common::firebase_config(&mock.base_url());
    forms.emailjs = common::emailjs_config(&mock.url("/send"), None).emailjs;
    forms.provider = Some("google-sheets".to_string());

    let err = common::relay(forms).dispatch(&payload()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.to_string(), "Google Sheets endpoint is not configured.");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn sheets_non_2xx_is_a_transport_error() {
    let mock = MockProvider::start(500).await;
    let relay = common::relay(common::sheets_config(&mock.url("/exec")));

    let err = relay.dispatch(&payload()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Failed to submit to Google Sheets.");
    assert!(matches!(err, RelayError::Transport { status: Some(500), .. }));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn network_failure_is_a_transport_error() {
    let relay = common::relay(common::sheets_config(&common::unreachable_url()));

    let err = relay.dispatch(&payload()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err, RelayError::Transport { status: None, .. }));
}

// ── Firebase ────────────────────────────────────────────────────

#[tokio::test]
async fn firebase_posts_one_string_field_document() {
    let mock = MockProvider::start(200).await;
    let relay = common::relay(common::firebase_config(&mock.base_url()));
    let payload = payload();

    relay.dispatch(&payload).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(
        req.path,
        "/projects/eco-site/databases/(default)/documents/formSubmissions"
    );
    assert_eq!(req.query.as_deref(), Some("key=test-key"));

    let fields = req.body["fields"].as_object().unwrap();
    assert_eq!(fields.len(), payload.len());
    for (name, value) in payload.iter() {
        assert_eq!(fields[name], json!({ "stringValue": value }), "field {name}");
    }
    assert_eq!(req.body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn firebase_requires_key_project_and_collection() {
    let mock = MockProvider::start(200).await;

    for strip in ["apiKey", "projectId", "collection"] {
        let mut forms = common::firebase_config(&mock.base_url());
        match strip {
            "apiKey" => forms.firebase.api_key.clear(),
            "projectId" => forms.firebase.project_id.clear(),
            _ => forms.firebase.collection.clear(),
        }

        let err = common::relay(forms).dispatch(&payload()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "missing {strip}");
        assert_eq!(err.to_string(), "Firebase configuration is incomplete.");
    }

    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn firebase_non_2xx_is_a_transport_error() {
    let mock = MockProvider::start(403).await;
    let relay = common::relay(common::firebase_config(&mock.base_url()));

    let err = relay.dispatch(&payload()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Failed to submit to Firebase.");
}

// ── EmailJS ─────────────────────────────────────────────────────

#[tokio::test]
async fn emailjs_sends_envelope_with_configured_recipient() {
    let mock = MockProvider::start(200).await;
    let relay = common::relay(common::emailjs_config(
        &mock.url("/api/v1.0/email/send"),
        Some("programs@example.org"),
    ));
    let payload = payload();

    relay.dispatch(&payload).await.unwrap();

    assert_eq!(mock.request_count(), 1);
    let body = mock.last_body();
    assert_eq!(body["service_id"], "service_eco");
    assert_eq!(body["template_id"], "template_contact");
    assert_eq!(body["user_id"], "pk_live_123");

    let params = body["template_params"].as_object().unwrap();
    assert_eq!(params["to_email"], "programs@example.org");
    for (name, value) in payload.iter() {
        assert_eq!(params[name], value);
    }
    assert_eq!(params.len(), payload.len() + 1);
}

#[tokio::test]
async fn emailjs_recipient_defaults_when_unset() {
    let mock = MockProvider::start(200).await;
    let relay = common::relay(common::emailjs_config(&mock.url("/send"), None));

    relay.dispatch(&payload()).await.unwrap();

    assert_eq!(
        mock.last_body()["template_params"]["to_email"],
        DEFAULT_TO_EMAIL
    );
}

#[tokio::test]
async fn emailjs_recipient_wins_over_form_field() {
    let mock = MockProvider::start(200).await;
    let relay = common::relay(common::emailjs_config(&mock.url("/send"), None));
    let form = Form::new()
        .with_marker("contact")
        .with_field("to_email", "attacker@example.com");

    relay.submit(&form, "/contact.html").await.unwrap();

    assert_eq!(
        mock.last_body()["template_params"]["to_email"],
        DEFAULT_TO_EMAIL
    );
}

#[tokio::test]
async fn emailjs_requires_service_template_and_key() {
    let mock = MockProvider::start(200).await;
    let mut forms = common::emailjs_config(&mock.url("/send"), None);
    forms.emailjs.public_key.clear();

    let err = common::relay(forms).dispatch(&payload()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.to_string(), "EmailJS configuration is incomplete.");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn emailjs_non_2xx_is_a_transport_error() {
    let mock = MockProvider::start(400).await;
    let relay = common::relay(common::emailjs_config(&mock.url("/send"), None));

    let err = relay.dispatch(&payload()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.to_string(), "Failed to send through EmailJS.");
}

// ── Provider selection ──────────────────────────────────────────

#[tokio::test]
async fn unknown_provider_fails_before_any_request() {
    let mock = MockProvider::start(200).await;
    let mut forms = common::sheets_config(&mock.url("/exec"));
    forms.provider = Some("carrier-pigeon".to_string());

    let err = common::relay(forms).dispatch(&payload()).await.unwrap_err();

    assert!(err.is_unknown_provider());
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.to_string(), "Unknown form provider configured.");
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn forms_config_parses_site_config_shape() {
    let raw = r#"{
        "provider": "firebase",
        "googleSheets": { "endpoint": "" },
        "firebase": { "apiKey": "k", "projectId": "p", "collection": "formSubmissions" },
        "emailjs": { "serviceId": "", "templateId": "", "publicKey": "", "toEmail": "info@example.org" }
    }"#;

    let forms: FormsConfig = serde_json::from_str(raw).unwrap();

    assert_eq!(forms.provider_tag(), "firebase");
    assert_eq!(forms.firebase.api_key, "k");
    assert_eq!(forms.firebase.collection, "formSubmissions");
    assert_eq!(forms.emailjs.to_email.as_deref(), Some("info@example.org"));
}

#[test]
fn empty_forms_config_selects_sheets() {
    let forms: FormsConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(forms.provider_tag(), "google-sheets");

    let forms = FormsConfig {
        provider: Some(String::new()),
        ..FormsConfig::default()
    };
    assert_eq!(forms.provider_tag(), "google-sheets");
}

#[test]
fn forms_config_reads_individual_variables() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("RELAY_PROVIDER", "emailjs"),
        ("RELAY_EMAILJS_SERVICE_ID", "service_eco"),
        ("RELAY_EMAILJS_TEMPLATE_ID", "template_contact"),
        ("RELAY_EMAILJS_PUBLIC_KEY", "pk_live_123"),
        ("RELAY_EMAILJS_TO_EMAIL", ""),
        ("RELAY_FIREBASE_PROJECT_ID", "eco-site"),
    ]);

    let forms = FormsConfig::from_vars(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(forms.provider_tag(), "emailjs");
    assert_eq!(forms.emailjs.service_id, "service_eco");
    assert_eq!(forms.emailjs.to_email, None);
    assert_eq!(forms.firebase.project_id, "eco-site");
    assert_eq!(forms.firebase.collection, "formSubmissions");
    assert_eq!(forms.google_sheets.endpoint, "");
}

#[test]
fn forms_config_file_takes_precedence_over_variables() {
    let path = std::env::temp_dir().join(format!("formrelay-{}.json", uuid::Uuid::now_v7()));
    std::fs::write(
        &path,
        r#"{ "provider": "google-sheets", "googleSheets": { "endpoint": "https://script.google.com/macros/s/x/exec" } }"#,
    )
    .unwrap();
    let path_str = path.to_string_lossy().into_owned();

    let forms = FormsConfig::from_vars(|key| match key {
        "RELAY_FORMS_CONFIG" => Some(path_str.clone()),
        "RELAY_PROVIDER" => Some("firebase".to_string()),
        _ => None,
    })
    .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(forms.provider_tag(), "google-sheets");
    assert_eq!(
        forms.google_sheets.endpoint,
        "https://script.google.com/macros/s/x/exec"
    );
}

#[test]
fn forms_config_file_errors_name_the_file() {
    let missing = std::env::temp_dir().join("formrelay-does-not-exist.json");
    let err = FormsConfig::from_file(&missing).unwrap_err();
    assert!(err.contains("RELAY_FORMS_CONFIG"), "{err}");
    assert!(err.contains("formrelay-does-not-exist.json"), "{err}");

    let bad = std::env::temp_dir().join(format!("formrelay-{}.json", uuid::Uuid::now_v7()));
    std::fs::write(&bad, "[1, 2]").unwrap();
    let err = FormsConfig::from_file(&bad).unwrap_err();
    std::fs::remove_file(&bad).unwrap();
    assert!(err.starts_with("Invalid RELAY_FORMS_CONFIG"), "{err}");
}
