//! Vendor error classification.
//!
//! Maps raw error strings coming out of the reviewer SDK onto the closed
//! [`ErrorCode`] set by case-insensitive substring matching. Cancellation-
//! shaped errors (an `AbortError` name or an "aborted" message) bypass the
//! pattern table entirely and become `CODEX_TIMEOUT` — the SDK does not
//! surface deadline expiry as a distinct error shape, so it is detected
//! here by name and message.

use super::{BridgeError, ErrorCode};

// ─────────────────────────────────────────────────────────────────────────────
// Pattern table
// ─────────────────────────────────────────────────────────────────────────────

struct Pattern {
    check: fn(&str) -> bool,
    code: ErrorCode,
}

/// Known vendor error patterns, checked in order against the lowercased
/// message. First match wins.
fn patterns() -> &'static [Pattern] {
    static PATTERNS: &[Pattern] = &[
        Pattern {
            check: |s| s.contains("api_key") || s.contains("authentication") || s.contains("401"),
            code: ErrorCode::AuthError,
        },
        Pattern {
            check: |s| s.contains("model") && (s.contains("not supported") || s.contains("not found")),
            code: ErrorCode::ModelError,
        },
        Pattern {
            check: |s| s.contains("429") || s.contains("rate_limit") || s.contains("rate limit"),
            code: ErrorCode::RateLimited,
        },
        Pattern {
            check: |s| {
                s.contains("fetch failed") || s.contains("econnrefused") || s.contains("enotfound")
            },
            code: ErrorCode::NetworkError,
        },
    ];
    PATTERNS
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Whether an error name/message pair is cancellation-shaped.
///
/// True for an `AbortError` name or any message containing "aborted"
/// (case-insensitive).
#[must_use]
pub fn is_cancellation(name: Option<&str>, message: &str) -> bool {
    if name.is_some_and(|n| n == "AbortError") {
        return true;
    }
    message.to_lowercase().contains("aborted")
}

/// Classify a raw vendor error string into the public taxonomy.
///
/// `configured_model` supplies the fallback name for `MODEL_ERROR` when the
/// message carries no quoted model name. `timeout_seconds` shapes the
/// message of the cancellation short-circuit.
#[must_use]
pub fn classify(raw: &str, configured_model: &str, timeout_seconds: u64) -> BridgeError {
    if is_cancellation(None, raw) {
        return BridgeError::timeout(timeout_seconds);
    }

    let lower = raw.to_lowercase();
    for pattern in patterns() {
        if (pattern.check)(&lower) {
            return match pattern.code {
                ErrorCode::ModelError => {
                    let name = extract_quoted(raw).unwrap_or_else(|| configured_model.to_owned());
                    BridgeError::new(
                        ErrorCode::ModelError,
                        format!("model '{name}' is not supported"),
                    )
                }
                code => BridgeError::new(code, raw.to_owned()),
            };
        }
    }

    BridgeError::unknown(raw)
}

/// Extract the first quoted token from a message (`'…'`, `"…"`, or `` `…` ``).
fn extract_quoted(message: &str) -> Option<String> {
    for quote in ['\'', '"', '`'] {
        let mut parts = message.split(quote);
        let _ = parts.next()?;
        if let Some(inner) = parts.next() {
            if !inner.is_empty() && parts.next().is_some() {
                return Some(inner.to_owned());
            }
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "gpt-5-codex";

    #[test]
    fn abort_error_name_short_circuits() {
        assert!(is_cancellation(Some("AbortError"), "whatever"));
    }

    #[test]
    fn aborted_message_short_circuits() {
        assert!(is_cancellation(None, "The operation was Aborted"));
        assert!(is_cancellation(None, "request aborted mid-flight"));
    }

    #[test]
    fn plain_failure_is_not_cancellation() {
        assert!(!is_cancellation(None, "connection reset"));
        assert!(!is_cancellation(Some("TypeError"), "connection reset"));
    }

    #[test]
    fn classify_aborted_as_timeout() {
        let err = classify("stream aborted by token", MODEL, 300);
        assert_eq!(err.code, ErrorCode::CodexTimeout);
        assert_eq!(err.message, "review timed out after 300s");
    }

    #[test]
    fn classify_api_key() {
        let err = classify("invalid API_KEY supplied", MODEL, 300);
        assert_eq!(err.code, ErrorCode::AuthError);
        assert_eq!(err.message, "invalid API_KEY supplied");
    }

    #[test]
    fn classify_authentication() {
        let err = classify("Authentication failed for account", MODEL, 300);
        assert_eq!(err.code, ErrorCode::AuthError);
    }

    #[test]
    fn classify_401() {
        let err = classify("HTTP 401 Unauthorized", MODEL, 300);
        assert_eq!(err.code, ErrorCode::AuthError);
    }

    #[test]
    fn classify_model_not_supported_with_quoted_name() {
        let err = classify("The model 'o9-review' is not supported", MODEL, 300);
        assert_eq!(err.code, ErrorCode::ModelError);
        assert_eq!(err.message, "model 'o9-review' is not supported");
    }

    #[test]
    fn classify_model_not_found_falls_back_to_config() {
        let err = classify("model not found", MODEL, 300);
        assert_eq!(err.code, ErrorCode::ModelError);
        assert_eq!(err.message, format!("model '{MODEL}' is not supported"));
    }

    #[test]
    fn not_found_without_model_is_unknown() {
        // "not found" alone must not trip the model pattern.
        let err = classify("resource not found", MODEL, 300);
        assert_eq!(err.code, ErrorCode::UnknownError);
    }

    #[test]
    fn classify_rate_limited() {
        for msg in ["HTTP 429", "rate_limit_error", "Rate limit exceeded"] {
            let err = classify(msg, MODEL, 300);
            assert_eq!(err.code, ErrorCode::RateLimited, "failed for {msg}");
        }
    }

    #[test]
    fn classify_network() {
        for msg in [
            "fetch failed",
            "connect ECONNREFUSED 127.0.0.1:443",
            "getaddrinfo ENOTFOUND api.example.com",
        ] {
            let err = classify(msg, MODEL, 300);
            assert_eq!(err.code, ErrorCode::NetworkError, "failed for {msg}");
        }
    }

    #[test]
    fn classify_unknown_preserves_raw_message() {
        let err = classify("something odd happened", MODEL, 300);
        assert_eq!(err.code, ErrorCode::UnknownError);
        assert_eq!(err.message, "something odd happened");
    }

    #[test]
    fn auth_wins_over_rate_limit_by_order() {
        // Both patterns present; the table is checked in order.
        let err = classify("401 after rate limit", MODEL, 300);
        assert_eq!(err.code, ErrorCode::AuthError);
    }

    #[test]
    fn extract_quoted_variants() {
        assert_eq!(extract_quoted("model 'a-1' bad").as_deref(), Some("a-1"));
        assert_eq!(extract_quoted("model \"b-2\" bad").as_deref(), Some("b-2"));
        assert_eq!(extract_quoted("model `c-3` bad").as_deref(), Some("c-3"));
        assert_eq!(extract_quoted("no quotes here"), None);
        assert_eq!(extract_quoted("dangling ' quote"), None);
    }
}
