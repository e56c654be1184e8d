//! Configuration types with compiled-in defaults.
//!
//! Every field has a serde default so a partial (or empty) config file is
//! valid. Unknown keys are ignored for forward compatibility; unknown enum
//! values are rejected by deserialization.

use bridge_core::types::CodeSeverity;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Reasoning effort passed through to the reviewer model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

impl ReasoningEffort {
    /// Wire representation handed to the vendor SDK.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Default depth for plan reviews.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanDepth {
    Quick,
    #[default]
    Thorough,
}

impl PlanDepth {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Thorough => "thorough",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-kind defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Defaults applied to plan reviews when the request omits them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDefaults {
    /// Focus areas injected into the plan prompt.
    #[serde(default)]
    pub focus: Vec<String>,
    /// Review depth.
    #[serde(default)]
    pub depth: PlanDepth,
}

/// Defaults applied to code reviews.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeDefaults {
    /// Review criteria injected into the code prompt.
    #[serde(default)]
    pub criteria: Vec<String>,
    /// Whether the prompt insists on test coverage for changed code.
    #[serde(default)]
    pub require_tests: bool,
}

/// Defaults applied to precommit reviews.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecommitDefaults {
    /// Severities at or above which a finding blocks the commit.
    #[serde(default = "default_block_on")]
    pub block_on: Vec<CodeSeverity>,
}

fn default_block_on() -> Vec<CodeSeverity> {
    vec![CodeSeverity::Critical, CodeSeverity::Major]
}

impl Default for PrecommitDefaults {
    fn default() -> Self {
        Self {
            block_on: default_block_on(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level config
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable bridge configuration, read once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Reviewer model name.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Reasoning effort for the reviewer.
    #[serde(default)]
    pub reasoning_effort: ReasoningEffort,
    /// Per-turn wall-clock deadline in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Chunk budget in estimated tokens.
    #[serde(default = "default_max_chunk_tokens")]
    pub max_chunk_tokens: usize,
    /// Project background injected into every prompt.
    #[serde(default)]
    pub project_context: String,
    /// Plan review defaults.
    #[serde(default)]
    pub plan: PlanDefaults,
    /// Code review defaults.
    #[serde(default)]
    pub code: CodeDefaults,
    /// Precommit review defaults.
    #[serde(default)]
    pub precommit: PrecommitDefaults,
}

fn default_model_name() -> String {
    "gpt-5-codex".to_owned()
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_max_chunk_tokens() -> usize {
    8000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            reasoning_effort: ReasoningEffort::default(),
            timeout_seconds: default_timeout_seconds(),
            max_chunk_tokens: default_max_chunk_tokens(),
            project_context: String::new(),
            plan: PlanDefaults::default(),
            code: CodeDefaults::default(),
            precommit: PrecommitDefaults::default(),
        }
    }
}

impl BridgeConfig {
    /// Semantic constraints serde cannot express.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("timeout_seconds must be a positive integer".into());
        }
        if self.max_chunk_tokens == 0 {
            return Err("max_chunk_tokens must be a positive integer".into());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
