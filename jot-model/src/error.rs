use std::sync::LazyLock;

use regex::Regex;

use crate::client::Provider;

/// Why the model-assisted path could not produce a candidate.
///
/// Every variant is recoverable: the parser facade falls back to the rules.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No API key for the configured provider.
    #[error("no API key configured for {0}")]
    MissingCredential(Provider),

    /// Transport failure, including timeouts.
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("model service returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The service answered but carried no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The text did not contain one JSON object.
    #[error("malformed model response: {0}")]
    Malformed(String),

    /// Could not start an async runtime for the request.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// The thread driving the request panicked.
    #[error("model request worker panicked")]
    WorkerPanicked,
}

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"sk-ant-[A-Za-z0-9_\-]{10,}", r"sk-[A-Za-z0-9_\-]{20,}"]
        .iter()
        .map(|p| Regex::new(p).expect("secret pattern regex"))
        .collect()
});

const MAX_ERROR_BODY_CHARS: usize = 256;

/// Collapse whitespace, redact anything key-shaped and truncate, so error
/// bodies are safe to log.
pub(crate) fn sanitize_error_body(raw: &str) -> String {
    let mut s = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    for re in SECRET_PATTERNS.iter() {
        s = re.replace_all(&s, "[REDACTED]").into_owned();
    }
    if s.chars().count() > MAX_ERROR_BODY_CHARS {
        let short: String = s.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return format!("{short}...[truncated]");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_redacts_and_truncates() {
        let body = "{\n  \"error\": \"bad key sk-abcdefghijklmnopqrstuvwxyz0123\" }";
        let s = sanitize_error_body(body);
        assert!(s.contains("[REDACTED]"));
        assert!(!s.contains("sk-abcdef"));
        assert!(!s.contains('\n'));

        let long = "x".repeat(1000);
        assert!(sanitize_error_body(&long).ends_with("...[truncated]"));
    }

    #[test]
    fn every_secret_pattern_compiles() {
        assert_eq!(SECRET_PATTERNS.len(), 2);
        let s = sanitize_error_body("key sk-ant-api03-abcdefghij rejected");
        assert_eq!(s, "key [REDACTED] rejected");
    }
}
