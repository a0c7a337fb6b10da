use detector_core::{AnalysisError, AnalysisResult, ErrorKind};
use providers::ProviderRegistry;
use std::fmt::Write;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_INPUT: i32 = 2;
pub const EXIT_PROVIDER: i32 = 3;
pub const EXIT_INTERNAL: i32 = 4;

pub fn exit_code(err: &AnalysisError) -> i32 {
    match err.kind() {
        ErrorKind::InvalidInput => EXIT_INVALID_INPUT,
        ErrorKind::Provider => EXIT_PROVIDER,
        ErrorKind::Internal => EXIT_INTERNAL,
    }
}

/// Exit code for any error bubbling out of `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<AnalysisError>()
        .map(exit_code)
        .unwrap_or(EXIT_FAILURE)
}

pub fn error_json(err: &AnalysisError) -> serde_json::Value {
    let kind = match err.kind() {
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::Provider => "provider",
        ErrorKind::Internal => "internal",
    };
    serde_json::json!({
        "status": "error",
        "kind": kind,
        "retryable": err.is_retryable(),
        "detail": err.to_string(),
    })
}

/// One `name\tkind` line per provider the registry accepted, default marked.
pub fn models(registry: &ProviderRegistry, default_provider: &str) -> String {
    let mut out = String::new();
    for name in registry.names() {
        let kind = registry.spec(name).map(|s| s.backend.kind()).unwrap_or("unknown");
        let marker = if name == default_provider { " (default)" } else { "" };
        let _ = writeln!(out, "{name}\t{kind}{marker}");
    }
    out
}

pub fn models_json(registry: &ProviderRegistry) -> serde_json::Value {
    serde_json::json!({ "models": registry.names() })
}

/// Human-readable report: matrix first, then every pair, clones flagged.
pub fn table(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let width = result
        .text_ids
        .iter()
        .map(|id| id.chars().count())
        .max()
        .unwrap_or(0)
        .max(6);

    let _ = writeln!(out, "provider: {}", result.provider_used);
    let _ = write!(out, "{:width$}", "");
    for id in &result.text_ids {
        let _ = write!(out, " {id:>width$}");
    }
    let _ = writeln!(out);
    for (id, row) in result.text_ids.iter().zip(result.similarity_matrix.rows()) {
        let _ = write!(out, "{id:width$}");
        for value in row {
            let _ = write!(out, " {value:>width$.3}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    for pair in &result.pairs {
        let marker = if pair.is_clone() { "CLONE" } else { "" };
        let _ = writeln!(
            out,
            "{:width$} {:width$} {:>7.4} {}",
            pair.id1(),
            pair.id2(),
            pair.similarity(),
            marker
        );
    }
    let _ = writeln!(
        out,
        "{} of {} pairs flagged",
        result.clones().count(),
        result.pairs.len()
    );
    out
}
