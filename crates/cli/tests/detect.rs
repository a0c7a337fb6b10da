use cli::render::{
    error_json, exit_code, exit_code_for, models, models_json, table, EXIT_FAILURE,
    EXIT_INTERNAL, EXIT_INVALID_INPUT, EXIT_PROVIDER,
};
use cli::request::RequestDocument;
use detector_core::config::AnalysisConfig;
use detector_core::pipeline::analyze;
use detector_core::AnalysisError;
use providers::config::BackendConfig;
use providers::{ProviderRegistry, ProviderSpec};
use std::fs;
use tempfile::tempdir;

const REQUEST: &str = r#"{
    "texts": [
        { "id": "a", "content": "The cat sat on the mat" },
        { "id": "b", "content": "The cat sat on the mat." },
        { "id": "c", "content": "Quantum entanglement is weird" }
    ],
    "model": "bow",
    "threshold": 0.9
}"#;

fn defaults() -> AnalysisConfig {
    AnalysisConfig {
        default_threshold: 0.8,
        default_provider: "fallback".to_string(),
    }
}

#[test]
fn document_values_are_used_when_flags_are_absent() {
    let request = RequestDocument::parse(REQUEST)
        .unwrap()
        .into_request(&defaults(), None, None);
    assert_eq!(request.provider, "bow");
    assert!((request.threshold - 0.9).abs() < 1e-6);
    assert_eq!(request.items.len(), 3);
    assert_eq!(request.items[2].id, "c");
}

#[test]
fn flags_override_document_and_config_fills_gaps() {
    let doc = RequestDocument::parse(REQUEST).unwrap();
    let request = doc.into_request(&defaults(), Some("other"), Some(0.5));
    assert_eq!(request.provider, "other");
    assert_eq!(request.threshold, 0.5);

    let bare = RequestDocument::parse(r#"{"texts": [{"id": "x", "content": "y"}]}"#).unwrap();
    let request = bare.into_request(&defaults(), None, None);
    assert_eq!(request.provider, "fallback");
    assert_eq!(request.threshold, 0.8);
}

#[test]
fn malformed_documents_are_rejected() {
    assert!(RequestDocument::parse(r#"{"texts": "nope"}"#).is_err());
    assert!(RequestDocument::parse("not json").is_err());
}

#[tokio::test]
async fn request_file_runs_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("request.json");
    fs::write(&path, REQUEST).unwrap();

    let request = RequestDocument::read(&path)
        .unwrap()
        .into_request(&defaults(), None, None);
    let registry = ProviderRegistry::new(vec![ProviderSpec::new(
        "bow",
        BackendConfig::Hashing { dimension: 128 },
    )]);
    let result = analyze(request, &registry).await.unwrap();

    let rendered = table(&result);
    assert!(rendered.contains("provider: bow"));
    assert!(rendered.contains("1 of 3 pairs flagged"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["provider_used"], "bow");
    assert_eq!(json["text_ids"], serde_json::json!(["a", "b", "c"]));
    assert_eq!(json["similarity_matrix"].as_array().unwrap().len(), 3);
    assert_eq!(json["pairs"][0]["id1"], "a");
    assert_eq!(json["pairs"][0]["id2"], "b");
    assert_eq!(json["pairs"][0]["is_clone"], true);
}

#[test]
fn exit_codes_follow_error_kind() {
    assert_eq!(
        exit_code(&AnalysisError::InsufficientBatchSize { found: 1 }),
        EXIT_INVALID_INPUT
    );
    assert_eq!(
        exit_code(&AnalysisError::ProviderUnavailable {
            provider: "p".into(),
            cause: "offline".into(),
        }),
        EXIT_PROVIDER
    );
    assert_eq!(
        exit_code(&AnalysisError::DimensionMismatch {
            index: 1,
            expected: 2,
            found: 3,
        }),
        EXIT_INTERNAL
    );

    let wrapped = anyhow::Error::from(AnalysisError::DuplicateId { id: "a".into() });
    assert_eq!(exit_code_for(&wrapped), EXIT_INVALID_INPUT);
    assert_eq!(exit_code_for(&anyhow::anyhow!("disk full")), EXIT_FAILURE);
}

#[test]
fn error_json_reports_kind_and_retryability() {
    let value = error_json(&AnalysisError::EmbeddingBackend {
        provider: "remote".into(),
        batch_size: 4,
        cause: "timed out".into(),
    });
    assert_eq!(value["status"], "error");
    assert_eq!(value["kind"], "provider");
    assert_eq!(value["retryable"], true);
    assert!(value["detail"].as_str().unwrap().contains("timed out"));
}

#[test]
fn models_listing_shows_each_configured_name_once() {
    let registry = ProviderRegistry::new(vec![
        ProviderSpec::new("bow", BackendConfig::Hashing { dimension: 64 }),
        ProviderSpec::new("wide", BackendConfig::Hashing { dimension: 512 }),
        ProviderSpec::new("bow", BackendConfig::Hashing { dimension: 8 }),
    ]);

    let listing = models(&registry, "wide");
    assert_eq!(listing, "bow\thashing\nwide\thashing (default)\n");

    assert_eq!(
        models_json(&registry),
        serde_json::json!({ "models": ["bow", "wide"] })
    );
}
