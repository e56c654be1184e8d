//! Multi-chunk result merging.
//!
//! Code review: worst verdict wins, summaries concatenate, findings dedup
//! by `(file, line, category)` keeping the highest severity. Findings
//! missing `file` or `line` are never deduplicated. Output order is deduped
//! findings in last-write insertion order, then null-keyed findings in
//! original order.
//!
//! Precommit: `ready_to_commit` is the AND over chunks; blockers and
//! warnings concatenate without dedup.

use bridge_core::types::{CodeFinding, CodeReviewResult, PrecommitResult};

use crate::schema::{CodeOutcome, PrecommitOutcome};

/// Merge per-chunk code outcomes into one result.
///
/// `session_id` is the id of the last chunk's thread.
#[must_use]
pub fn merge_code(outcomes: Vec<CodeOutcome>, session_id: String) -> CodeReviewResult {
    let chunks = outcomes.len();
    let verdict = outcomes
        .iter()
        .map(|o| o.verdict)
        .max()
        .expect("at least one chunk");
    let summary = outcomes
        .iter()
        .map(|o| o.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut keyed: Vec<((String, u32, String), CodeFinding)> = Vec::new();
    let mut unkeyed: Vec<CodeFinding> = Vec::new();

    for finding in outcomes.into_iter().flat_map(|o| o.findings) {
        match finding.dedup_key() {
            None => unkeyed.push(finding),
            Some(key) => {
                let mut finding = finding;
                if let Some(pos) = keyed.iter().position(|(k, _)| *k == key) {
                    let (_, prior) = keyed.remove(pos);
                    finding.severity = finding.severity.max(prior.severity);
                }
                keyed.push((key, finding));
            }
        }
    }

    let findings = keyed
        .into_iter()
        .map(|(_, f)| f)
        .chain(unkeyed)
        .collect();

    CodeReviewResult {
        verdict,
        summary,
        findings,
        session_id,
        chunks_reviewed: Some(chunks),
    }
}

/// Merge per-chunk precommit outcomes into one result.
#[must_use]
pub fn merge_precommit(outcomes: Vec<PrecommitOutcome>, session_id: String) -> PrecommitResult {
    let chunks = outcomes.len();
    let mut ready = true;
    let mut blockers = Vec::new();
    let mut warnings = Vec::new();
    for outcome in outcomes {
        ready = ready && outcome.ready_to_commit;
        blockers.extend(outcome.blockers);
        warnings.extend(outcome.warnings);
    }
    PrecommitResult {
        ready_to_commit: ready,
        blockers,
        warnings,
        session_id,
        chunks_reviewed: Some(chunks),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
