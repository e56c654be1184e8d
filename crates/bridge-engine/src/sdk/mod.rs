//! Vendor SDK boundary.
//!
//! The reviewer client depends only on these traits. The production
//! implementation ([`codex::CodexCliSdk`]) drives the `codex` CLI as a
//! subprocess; tests use the scripted SDK in [`crate::testing`].
//!
//! Threads are short-lived values keyed by id; nothing here caches thread
//! objects across requests.

pub mod codex;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

// ─────────────────────────────────────────────────────────────────────────────
// Options and outputs
// ─────────────────────────────────────────────────────────────────────────────

/// Options for starting or resuming a reviewer thread.
#[derive(Clone, Debug)]
pub struct ThreadOptions {
    /// Reviewer model name.
    pub model: String,
    /// Sandbox the reviewer's execution environment.
    pub sandbox_mode: String,
    /// The reviewer runs against arbitrary payloads, not a checkout.
    pub skip_git_repo_check: bool,
    /// Reasoning effort knob.
    pub reasoning_effort: String,
}

impl ThreadOptions {
    /// Standard options: read-only sandbox, no git repo check.
    pub fn new(model: impl Into<String>, reasoning_effort: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            sandbox_mode: "read-only".to_owned(),
            skip_git_repo_check: true,
            reasoning_effort: reasoning_effort.into(),
        }
    }
}

/// Options for a single turn.
pub struct TurnOptions {
    /// JSON Schema constraining the reviewer's output.
    pub output_schema: Value,
    /// Fires once when the turn's deadline expires.
    pub cancel: CancellationToken,
}

/// Raw output of one turn.
#[derive(Clone, Debug)]
pub struct TurnOutput {
    /// The reviewer's final message, expected to be a JSON document.
    pub final_response: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error surfaced by the vendor SDK.
///
/// Carries an optional error name alongside the message so cancellation
/// (`AbortError`) can be told apart from transport failures before any
/// substring classification runs.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct SdkError {
    pub name: Option<String>,
    pub message: String,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }

    /// The shape produced when a cancel token aborts an in-flight turn.
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            name: Some("AbortError".to_owned()),
            message: "turn aborted by cancellation token".to_owned(),
        }
    }
}

pub type SdkResult<T> = std::result::Result<T, SdkError>;

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// One reviewer thread: server-side conversational state keyed by id.
#[async_trait]
pub trait ReviewerThread: Send {
    /// The thread's id, if known. Fresh threads report their id only after
    /// the first turn; resumed threads know it up front.
    fn id(&self) -> Option<String>;

    /// Run one prompt/response exchange on this thread.
    async fn run(&mut self, prompt: &str, opts: &TurnOptions) -> SdkResult<TurnOutput>;
}

/// Factory for reviewer threads.
#[async_trait]
pub trait ReviewerSdk: Send + Sync {
    /// Start a fresh thread.
    async fn start_thread(&self, opts: &ThreadOptions) -> SdkResult<Box<dyn ReviewerThread>>;

    /// Resume the thread with the given id.
    async fn resume_thread(&self, id: &str, opts: &ThreadOptions)
        -> SdkResult<Box<dyn ReviewerThread>>;
}
