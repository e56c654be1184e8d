//! Human-readable CLI rendering with ANSI color.
//!
//! Color resolution: `FORCE_COLOR=0` forces off, `FORCE_COLOR=1` forces on,
//! `NO_COLOR` (any value) disables, otherwise color follows whether stdout
//! is a terminal.

use bridge_core::types::{
    CodeReviewResult, CodeSeverity, CodeVerdict, PlanReviewResult, PlanSeverity, PlanVerdict,
    PrecommitResult,
};

// ─────────────────────────────────────────────────────────────────────────────
// Color resolution
// ─────────────────────────────────────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";

/// Decide whether to color output.
#[must_use]
pub fn resolve_color(force_color: Option<&str>, no_color_set: bool, is_tty: bool) -> bool {
    match force_color {
        Some("0") => false,
        Some("1") => true,
        _ => !no_color_set && is_tty,
    }
}

/// Color decision from the live environment.
#[must_use]
pub fn color_from_env() -> bool {
    use std::io::IsTerminal;
    resolve_color(
        std::env::var("FORCE_COLOR").ok().as_deref(),
        std::env::var_os("NO_COLOR").is_some(),
        std::io::stdout().is_terminal(),
    )
}

fn paint(text: &str, codes: &str, enabled: bool) -> String {
    if enabled {
        format!("{codes}{text}{RESET}")
    } else {
        text.to_owned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderers
// ─────────────────────────────────────────────────────────────────────────────

fn plan_verdict_style(verdict: PlanVerdict) -> &'static str {
    match verdict {
        PlanVerdict::Approve => GREEN,
        PlanVerdict::Revise => YELLOW,
        PlanVerdict::Reject => RED,
    }
}

fn code_verdict_style(verdict: CodeVerdict) -> &'static str {
    match verdict {
        CodeVerdict::Approve => GREEN,
        CodeVerdict::RequestChanges => YELLOW,
        CodeVerdict::Reject => RED,
    }
}

fn plan_severity_style(severity: PlanSeverity) -> &'static str {
    match severity {
        PlanSeverity::Critical => RED,
        PlanSeverity::Major => YELLOW,
        PlanSeverity::Minor => CYAN,
        PlanSeverity::Suggestion => DIM,
    }
}

fn code_severity_style(severity: CodeSeverity) -> &'static str {
    match severity {
        CodeSeverity::Critical => RED,
        CodeSeverity::Major => YELLOW,
        CodeSeverity::Minor => CYAN,
        CodeSeverity::Nitpick => DIM,
    }
}

fn severity_tag(text: &str, style: &'static str, color: bool) -> String {
    paint(&format!("[{}]", text.to_uppercase()), style, color)
}

fn location(file: Option<&str>, line: Option<u32>) -> String {
    match (file, line) {
        (Some(file), Some(line)) => format!(" ({file}:{line})"),
        (Some(file), None) => format!(" ({file})"),
        _ => String::new(),
    }
}

/// Render a plan review for the terminal.
#[must_use]
pub fn render_plan(result: &PlanReviewResult, color: bool) -> String {
    let mut out = String::new();
    let verdict = result.verdict.as_str().to_uppercase();
    out.push_str(&format!(
        "Verdict: {}\n\n",
        paint(&verdict, plan_verdict_style(result.verdict), color)
    ));
    out.push_str(&result.summary);
    out.push('\n');
    if !result.findings.is_empty() {
        out.push_str(&format!("\nFindings ({}):\n", result.findings.len()));
        for finding in &result.findings {
            out.push_str(&format!(
                "  {} {}: {}{}\n",
                severity_tag(
                    severity_name_plan(finding.severity),
                    plan_severity_style(finding.severity),
                    color
                ),
                finding.category,
                finding.description,
                location(finding.file.as_deref(), finding.line),
            ));
            if let Some(suggestion) = &finding.suggestion {
                out.push_str(&format!("      suggestion: {suggestion}\n"));
            }
        }
    }
    out.push_str(&format!(
        "\n{}\n",
        paint(&format!("session: {}", result.session_id), DIM, color)
    ));
    out
}

fn severity_name_plan(severity: PlanSeverity) -> &'static str {
    match severity {
        PlanSeverity::Critical => "critical",
        PlanSeverity::Major => "major",
        PlanSeverity::Minor => "minor",
        PlanSeverity::Suggestion => "suggestion",
    }
}

/// Render a code review for the terminal.
#[must_use]
pub fn render_code(result: &CodeReviewResult, color: bool) -> String {
    let mut out = String::new();
    let verdict = result.verdict.as_str().to_uppercase();
    out.push_str(&format!(
        "Verdict: {}\n\n",
        paint(&verdict, code_verdict_style(result.verdict), color)
    ));
    out.push_str(&result.summary);
    out.push('\n');
    if !result.findings.is_empty() {
        out.push_str(&format!("\nFindings ({}):\n", result.findings.len()));
        for finding in &result.findings {
            out.push_str(&format!(
                "  {} {}: {}{}\n",
                severity_tag(
                    finding.severity.as_str(),
                    code_severity_style(finding.severity),
                    color
                ),
                finding.category,
                finding.description,
                location(finding.file.as_deref(), finding.line),
            ));
            if let Some(suggestion) = &finding.suggestion {
                out.push_str(&format!("      suggestion: {suggestion}\n"));
            }
        }
    }
    if let Some(chunks) = result.chunks_reviewed {
        out.push_str(&format!("\nReviewed in {chunks} chunks.\n"));
    }
    out.push_str(&format!(
        "\n{}\n",
        paint(&format!("session: {}", result.session_id), DIM, color)
    ));
    out
}

/// Render a precommit review for the terminal.
#[must_use]
pub fn render_precommit(result: &PrecommitResult, color: bool) -> String {
    let mut out = String::new();
    if result.ready_to_commit {
        out.push_str(&format!(
            "{}\n",
            paint("READY TO COMMIT", &format!("{BOLD}{GREEN}"), color)
        ));
    } else {
        out.push_str(&format!(
            "{}\n",
            paint("COMMIT BLOCKED", &format!("{BOLD}{RED}"), color)
        ));
    }
    if !result.blockers.is_empty() {
        out.push_str("\nBlockers:\n");
        for blocker in &result.blockers {
            out.push_str(&format!("  {} {blocker}\n", paint("✗", RED, color)));
        }
    }
    if !result.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &result.warnings {
            out.push_str(&format!("  {} {warning}\n", paint("!", YELLOW, color)));
        }
    }
    if let Some(chunks) = result.chunks_reviewed {
        out.push_str(&format!("\nReviewed in {chunks} chunks.\n"));
    }
    if !result.session_id.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            paint(&format!("session: {}", result.session_id), DIM, color)
        ));
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::types::CodeFinding;

    #[test]
    fn force_color_zero_beats_everything() {
        assert!(!resolve_color(Some("0"), false, true));
        assert!(!resolve_color(Some("0"), true, true));
    }

    #[test]
    fn force_color_one_beats_no_color_and_pipe() {
        assert!(resolve_color(Some("1"), true, false));
    }

    #[test]
    fn no_color_disables_on_tty() {
        assert!(!resolve_color(None, true, true));
    }

    #[test]
    fn tty_without_overrides_enables() {
        assert!(resolve_color(None, false, true));
        assert!(!resolve_color(None, false, false));
    }

    fn precommit(ready: bool) -> PrecommitResult {
        PrecommitResult {
            ready_to_commit: ready,
            blockers: if ready {
                vec![]
            } else {
                vec!["Missing error handling".to_owned()]
            },
            warnings: vec![],
            session_id: "s1".to_owned(),
            chunks_reviewed: None,
        }
    }

    #[test]
    fn blocked_precommit_prints_banner_and_blockers() {
        let out = render_precommit(&precommit(false), false);
        assert!(out.contains("COMMIT BLOCKED"));
        assert!(out.contains("Missing error handling"));
    }

    #[test]
    fn ready_precommit_prints_ready_banner() {
        let out = render_precommit(&precommit(true), false);
        assert!(out.contains("READY TO COMMIT"));
        assert!(!out.contains("Blockers:"));
    }

    #[test]
    fn colorless_output_has_no_escape_codes() {
        let out = render_precommit(&precommit(false), false);
        assert!(!out.contains('\x1b'));
        let colored = render_precommit(&precommit(false), true);
        assert!(colored.contains('\x1b'));
    }

    #[test]
    fn code_render_includes_findings_and_chunks() {
        let result = CodeReviewResult {
            verdict: CodeVerdict::RequestChanges,
            summary: "Needs work".to_owned(),
            findings: vec![CodeFinding {
                severity: CodeSeverity::Critical,
                category: "bug".to_owned(),
                description: "overflow".to_owned(),
                file: Some("src/a.rs".to_owned()),
                line: Some(10),
                suggestion: Some("use checked_add".to_owned()),
            }],
            session_id: "t1".to_owned(),
            chunks_reviewed: Some(2),
        };
        let out = render_code(&result, false);
        assert!(out.contains("Verdict: REQUEST_CHANGES"));
        assert!(out.contains("[CRITICAL] bug: overflow (src/a.rs:10)"));
        assert!(out.contains("suggestion: use checked_add"));
        assert!(out.contains("Reviewed in 2 chunks."));
        assert!(out.contains("session: t1"));
    }

    #[test]
    fn plan_render_shows_verdict_and_summary() {
        let result = PlanReviewResult {
            verdict: PlanVerdict::Approve,
            summary: "Plan looks solid".to_owned(),
            findings: vec![],
            session_id: "thread_abc".to_owned(),
        };
        let out = render_plan(&result, false);
        assert!(out.contains("Verdict: APPROVE"));
        assert!(out.contains("Plan looks solid"));
        assert!(out.contains("session: thread_abc"));
    }
}
