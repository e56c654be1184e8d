//! Error taxonomy for review-bridge.
//!
//! Every fallible operation in the workspace resolves to a [`BridgeError`]:
//! a closed [`ErrorCode`] plus a human-readable message, displayed as
//! `CODE: message`. Errors are values carried through `Result`; nothing in
//! non-test code panics on a failure path.
//!
//! The [`classify`] module maps raw vendor error strings onto this taxonomy.

pub mod classify;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// ErrorCode — the closed code set
// ─────────────────────────────────────────────────────────────────────────────

/// Machine-readable error codes surfaced to callers.
///
/// The set is closed: every error leaving the bridge carries exactly one of
/// these codes, and `UNKNOWN_ERROR` preserves the raw message for anything
/// unrecognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A reviewer turn exceeded its deadline.
    CodexTimeout,
    /// Two consecutive malformed or schema-invalid responses.
    CodexParseError,
    /// External git invocation failed or the ref is unsafe.
    GitError,
    /// Config file unreadable or invalid.
    ConfigError,
    /// Persistence operation failed.
    StorageError,
    /// Resume requested an unknown reviewer thread.
    SessionNotFound,
    /// Missing or invalid credential.
    AuthError,
    /// Model name unsupported.
    ModelError,
    /// Upstream rate-limit response.
    RateLimited,
    /// DNS/connect/fetch failure.
    NetworkError,
    /// Anything else; the raw message is preserved.
    UnknownError,
}

impl ErrorCode {
    /// Wire representation of the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CodexTimeout => "CODEX_TIMEOUT",
            Self::CodexParseError => "CODEX_PARSE_ERROR",
            Self::GitError => "GIT_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::StorageError => "STORAGE_ERROR",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::AuthError => "AUTH_ERROR",
            Self::ModelError => "MODEL_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::NetworkError => "NETWORK_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BridgeError
// ─────────────────────────────────────────────────────────────────────────────

/// An error value carrying a closed code and a message.
///
/// Displays as `CODE: message`, which is the exact string written to the
/// tool-call envelope and to CLI stderr.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct BridgeError {
    /// Classification of the failure.
    pub code: ErrorCode,
    /// Human-readable detail.
    pub message: String,
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Build an error from a code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A turn exceeded its per-turn deadline.
    #[must_use]
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::new(
            ErrorCode::CodexTimeout,
            format!("review timed out after {timeout_seconds}s"),
        )
    }

    /// Two consecutive malformed or invalid reviewer responses.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CodexParseError, message)
    }

    /// Git invocation failure.
    pub fn git(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GitError, message)
    }

    /// Configuration load failure.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Persistence failure.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Resume of an unknown reviewer thread.
    pub fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionNotFound, message)
    }

    /// Unclassified failure; the raw message is preserved.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
