//! Output schemas and validation of reviewer responses.
//!
//! Two halves:
//!
//! - The JSON Schemas handed to the vendor SDK so the reviewer constrains
//!   its own output (`session_id` is never part of them — the reviewer
//!   does not know its thread id).
//! - Narrowing functions that turn a parsed [`Value`] into the typed
//!   outcome for the current review kind, or a validation message suitable
//!   for the one-shot repair retry.
//!
//! Validation failures are a recoverable class distinct from transport
//! errors: the client retries the same prompt once before giving up with
//! `CODEX_PARSE_ERROR`.

use bridge_core::types::{CodeFinding, CodeVerdict, PlanFinding, PlanVerdict};
use serde::Deserialize;
use serde_json::{json, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes (result shapes minus session_id)
// ─────────────────────────────────────────────────────────────────────────────

/// Validated plan output for one turn.
#[derive(Clone, Debug, Deserialize)]
pub struct PlanOutcome {
    pub verdict: PlanVerdict,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<PlanFinding>,
}

/// Validated code output for one turn.
#[derive(Clone, Debug, Deserialize)]
pub struct CodeOutcome {
    pub verdict: CodeVerdict,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<CodeFinding>,
}

/// Validated precommit output for one turn.
#[derive(Clone, Debug, Deserialize)]
pub struct PrecommitOutcome {
    pub ready_to_commit: bool,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Schemas for the SDK
// ─────────────────────────────────────────────────────────────────────────────

fn finding_schema(severities: &[&str]) -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["severity", "category", "description"],
        "properties": {
            "severity": { "type": "string", "enum": severities },
            "category": { "type": "string" },
            "description": { "type": "string" },
            "file": { "type": ["string", "null"] },
            "line": { "type": ["integer", "null"], "minimum": 1 },
            "suggestion": { "type": ["string", "null"] }
        }
    })
}

/// Output schema for plan reviews.
#[must_use]
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["verdict", "summary", "findings"],
        "properties": {
            "verdict": { "type": "string", "enum": ["approve", "revise", "reject"] },
            "summary": { "type": "string" },
            "findings": {
                "type": "array",
                "items": finding_schema(&["critical", "major", "minor", "suggestion"])
            }
        }
    })
}

/// Output schema for code reviews.
#[must_use]
pub fn code_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["verdict", "summary", "findings"],
        "properties": {
            "verdict": { "type": "string", "enum": ["approve", "request_changes", "reject"] },
            "summary": { "type": "string" },
            "findings": {
                "type": "array",
                "items": finding_schema(&["critical", "major", "minor", "nitpick"])
            }
        }
    })
}

/// Output schema for precommit reviews.
#[must_use]
pub fn precommit_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["ready_to_commit", "blockers", "warnings"],
        "properties": {
            "ready_to_commit": { "type": "boolean" },
            "blockers": { "type": "array", "items": { "type": "string" } },
            "warnings": { "type": "array", "items": { "type": "string" } }
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Narrowing
// ─────────────────────────────────────────────────────────────────────────────

/// Narrow a parsed value to a plan outcome.
pub fn validate_plan(value: Value) -> Result<PlanOutcome, String> {
    let outcome: PlanOutcome =
        serde_json::from_value(value).map_err(|e| format!("invalid plan review output: {e}"))?;
    check_lines_positive(outcome.findings.iter().map(|f| f.line))?;
    Ok(outcome)
}

/// Narrow a parsed value to a code outcome.
pub fn validate_code(value: Value) -> Result<CodeOutcome, String> {
    let outcome: CodeOutcome =
        serde_json::from_value(value).map_err(|e| format!("invalid code review output: {e}"))?;
    check_lines_positive(outcome.findings.iter().map(|f| f.line))?;
    Ok(outcome)
}

/// Narrow a parsed value to a precommit outcome.
pub fn validate_precommit(value: Value) -> Result<PrecommitOutcome, String> {
    serde_json::from_value(value).map_err(|e| format!("invalid precommit output: {e}"))
}

fn check_lines_positive(lines: impl Iterator<Item = Option<u32>>) -> Result<(), String> {
    for line in lines.flatten() {
        if line == 0 {
            return Err("finding line numbers must be positive".into());
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::types::CodeSeverity;

    #[test]
    fn valid_plan_output_narrows() {
        let value = json!({
            "verdict": "approve",
            "summary": "Plan looks solid",
            "findings": [{
                "severity": "minor",
                "category": "style",
                "description": "Consider renaming",
                "file": null,
                "line": null,
                "suggestion": null
            }]
        });
        let outcome = validate_plan(value).unwrap();
        assert_eq!(outcome.verdict, PlanVerdict::Approve);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn plan_rejects_code_severity() {
        let value = json!({
            "verdict": "approve",
            "summary": "ok",
            "findings": [{
                "severity": "nitpick",
                "category": "style",
                "description": "x"
            }]
        });
        let err = validate_plan(value).unwrap_err();
        assert!(err.contains("invalid plan review output"));
    }

    #[test]
    fn code_rejects_plan_severity() {
        let value = json!({
            "verdict": "approve",
            "summary": "ok",
            "findings": [{
                "severity": "suggestion",
                "category": "style",
                "description": "x"
            }]
        });
        assert!(validate_code(value).is_err());
    }

    #[test]
    fn code_rejects_plan_verdict() {
        let value = json!({ "verdict": "revise", "summary": "ok", "findings": [] });
        assert!(validate_code(value).is_err());
    }

    #[test]
    fn missing_verdict_is_invalid() {
        let value = json!({ "summary": "ok", "findings": [] });
        assert!(validate_plan(value).is_err());
    }

    #[test]
    fn missing_findings_defaults_to_empty() {
        let value = json!({ "verdict": "approve", "summary": "ok" });
        let outcome = validate_plan(value).unwrap();
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn zero_line_is_invalid() {
        let value = json!({
            "verdict": "approve",
            "summary": "ok",
            "findings": [{
                "severity": "minor",
                "category": "bug",
                "description": "x",
                "file": "a.rs",
                "line": 0
            }]
        });
        let err = validate_code(value).unwrap_err();
        assert!(err.contains("positive"));
    }

    #[test]
    fn valid_code_output_narrows() {
        let value = json!({
            "verdict": "request_changes",
            "summary": "Needs work",
            "findings": [{
                "severity": "critical",
                "category": "bug",
                "description": "overflow",
                "file": "src/a.ts",
                "line": 10,
                "suggestion": "use checked_add"
            }]
        });
        let outcome = validate_code(value).unwrap();
        assert_eq!(outcome.verdict, CodeVerdict::RequestChanges);
        assert_eq!(outcome.findings[0].severity, CodeSeverity::Critical);
        assert_eq!(outcome.findings[0].line, Some(10));
    }

    #[test]
    fn valid_precommit_output_narrows() {
        let value = json!({
            "ready_to_commit": false,
            "blockers": ["Missing error handling"],
            "warnings": []
        });
        let outcome = validate_precommit(value).unwrap();
        assert!(!outcome.ready_to_commit);
        assert_eq!(outcome.blockers, vec!["Missing error handling"]);
    }

    #[test]
    fn precommit_requires_ready_flag() {
        let value = json!({ "blockers": [], "warnings": [] });
        assert!(validate_precommit(value).is_err());
    }

    #[test]
    fn non_object_is_invalid() {
        assert!(validate_plan(json!("just a string")).is_err());
        assert!(validate_code(json!(42)).is_err());
        assert!(validate_precommit(json!([])).is_err());
    }

    #[test]
    fn schemas_enumerate_kind_specific_severities() {
        let plan = plan_schema();
        let code = code_schema();
        let plan_sev = plan["properties"]["findings"]["items"]["properties"]["severity"]["enum"]
            .as_array()
            .unwrap();
        assert!(plan_sev.contains(&json!("suggestion")));
        assert!(!plan_sev.contains(&json!("nitpick")));
        let code_sev = code["properties"]["findings"]["items"]["properties"]["severity"]["enum"]
            .as_array()
            .unwrap();
        assert!(code_sev.contains(&json!("nitpick")));
        assert!(!code_sev.contains(&json!("suggestion")));
    }

    #[test]
    fn schemas_omit_session_id() {
        for schema in [plan_schema(), code_schema(), precommit_schema()] {
            assert!(schema["properties"].get("session_id").is_none());
        }
    }
}
