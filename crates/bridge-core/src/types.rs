//! Review kinds, severities, verdicts, findings, and result shapes.
//!
//! Result shapes are distinct per review kind (tagged structs rather than
//! one polymorphic record), and the two finding-severity enums are separate
//! types so a plan severity can never be smuggled into a code review.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Review kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The three review kinds the bridge dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKind {
    Plan,
    Code,
    Precommit,
}

impl ReviewKind {
    /// Wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Code => "code",
            Self::Precommit => "precommit",
        }
    }
}

impl std::fmt::Display for ReviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Severities
// ─────────────────────────────────────────────────────────────────────────────

/// Finding severity for plan reviews.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSeverity {
    Critical,
    Major,
    Minor,
    Suggestion,
}

/// Finding severity for code and precommit reviews.
///
/// Variants are declared in ascending rank so `Ord` gives
/// `nitpick < minor < major < critical`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSeverity {
    Nitpick,
    Minor,
    Major,
    Critical,
}

impl CodeSeverity {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nitpick => "nitpick",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Verdicts
// ─────────────────────────────────────────────────────────────────────────────

/// Verdict of a plan review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanVerdict {
    Approve,
    Revise,
    Reject,
}

impl PlanVerdict {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Revise => "revise",
            Self::Reject => "reject",
        }
    }
}

/// Verdict of a code review.
///
/// Declared in precedence order so `Ord` implements worst-wins merging:
/// `approve < request_changes < reject`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeVerdict {
    Approve,
    RequestChanges,
    Reject,
}

impl CodeVerdict {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::RequestChanges => "request_changes",
            Self::Reject => "reject",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Findings
// ─────────────────────────────────────────────────────────────────────────────

/// A single reviewer finding, generic over the per-kind severity enum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finding<S> {
    pub severity: S,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Finding with plan severities.
pub type PlanFinding = Finding<PlanSeverity>;
/// Finding with code severities.
pub type CodeFinding = Finding<CodeSeverity>;

impl CodeFinding {
    /// Dedup key when both `file` and `line` are present.
    ///
    /// Findings missing either are never deduplicated.
    #[must_use]
    pub fn dedup_key(&self) -> Option<(String, u32, String)> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some((file.clone(), line, self.category.clone())),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────────────

/// Structured outcome of a plan review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanReviewResult {
    pub verdict: PlanVerdict,
    pub summary: String,
    pub findings: Vec<PlanFinding>,
    pub session_id: String,
}

/// Structured outcome of a code review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeReviewResult {
    pub verdict: CodeVerdict,
    pub summary: String,
    pub findings: Vec<CodeFinding>,
    pub session_id: String,
    /// Present only when the diff was split across more than one chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_reviewed: Option<usize>,
}

/// Structured outcome of a precommit review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecommitResult {
    pub ready_to_commit: bool,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
    pub session_id: String,
    /// Present only when the diff was split across more than one chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_reviewed: Option<usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_verdict_precedence() {
        assert!(CodeVerdict::Approve < CodeVerdict::RequestChanges);
        assert!(CodeVerdict::RequestChanges < CodeVerdict::Reject);
        assert_eq!(
            CodeVerdict::Approve.max(CodeVerdict::Reject),
            CodeVerdict::Reject
        );
    }

    #[test]
    fn code_severity_rank() {
        assert!(CodeSeverity::Nitpick < CodeSeverity::Minor);
        assert!(CodeSeverity::Minor < CodeSeverity::Major);
        assert!(CodeSeverity::Major < CodeSeverity::Critical);
    }

    #[test]
    fn verdict_wire_values_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&CodeVerdict::RequestChanges).unwrap(),
            "\"request_changes\""
        );
        assert_eq!(
            serde_json::to_string(&PlanVerdict::Approve).unwrap(),
            "\"approve\""
        );
    }

    #[test]
    fn plan_severity_rejects_code_only_value() {
        // "nitpick" is a code severity, not a plan severity.
        let result = serde_json::from_str::<PlanSeverity>("\"nitpick\"");
        assert!(result.is_err());
        // and the reverse: "suggestion" is plan-only.
        let result = serde_json::from_str::<CodeSeverity>("\"suggestion\"");
        assert!(result.is_err());
    }

    #[test]
    fn finding_optional_fields_default_to_null() {
        let finding: CodeFinding = serde_json::from_str(
            r#"{"severity":"minor","category":"style","description":"rename"}"#,
        )
        .unwrap();
        assert_eq!(finding.file, None);
        assert_eq!(finding.line, None);
        assert_eq!(finding.suggestion, None);
    }

    #[test]
    fn dedup_key_requires_file_and_line() {
        let mut finding = CodeFinding {
            severity: CodeSeverity::Major,
            category: "bug".into(),
            description: "off by one".into(),
            file: Some("src/a.rs".into()),
            line: Some(10),
            suggestion: None,
        };
        assert_eq!(
            finding.dedup_key(),
            Some(("src/a.rs".into(), 10, "bug".into()))
        );
        finding.line = None;
        assert_eq!(finding.dedup_key(), None);
        finding.line = Some(10);
        finding.file = None;
        assert_eq!(finding.dedup_key(), None);
    }

    #[test]
    fn chunks_reviewed_omitted_when_none() {
        let result = CodeReviewResult {
            verdict: CodeVerdict::Approve,
            summary: "ok".into(),
            findings: vec![],
            session_id: "thread_1".into(),
            chunks_reviewed: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("chunks_reviewed"));

        let result = CodeReviewResult {
            chunks_reviewed: Some(2),
            ..result
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"chunks_reviewed\":2"));
    }

    #[test]
    fn review_kind_round_trip() {
        for kind in [ReviewKind::Plan, ReviewKind::Code, ReviewKind::Precommit] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: ReviewKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
