//! `review_precommit` handler.
//!
//! Diff resolution runs before preflight so a missing staged diff never
//! touches the session store. On the tool surface the no-staged-changes
//! sentinel is a structured non-error response; the CLI turns the same
//! condition into a regular error.

use async_trait::async_trait;
use bridge_core::types::{PrecommitResult, ReviewKind};
use bridge_core::BridgeError;
use bridge_engine::client::PrecommitRequest;
use bridge_engine::{ResolveArgs, ResolveError};
use bridge_store::NewReview;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::RpcContext;
use crate::handlers::parse_args;
use crate::registry::{ToolHandler, ToolSpec};
use crate::tracker::SessionTracker;

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct PrecommitArgs {
    #[serde(default = "default_true")]
    auto_diff: bool,
    #[serde(default)]
    diff: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    checklist: Vec<String>,
}

/// Gate a staged change-set before commit.
pub struct ReviewPrecommitHandler;

#[async_trait]
impl ToolHandler for ReviewPrecommitHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "review_precommit",
            description: "Review the staged diff (or a provided diff) and decide whether \
                          it is ready to commit, partitioning issues into blockers and \
                          warnings.",
            input_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "auto_diff": { "type": "boolean", "default": true },
                    "diff": { "type": "string" },
                    "session_id": { "type": "string" },
                    "checklist": { "type": "array", "items": { "type": "string" } }
                }
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &RpcContext) -> Result<Value, BridgeError> {
        let args: PrecommitArgs = parse_args(args)?;

        let resolve_args = ResolveArgs {
            diff: args.diff,
            auto_diff: args.auto_diff,
        };
        let diff = match ctx.resolver.resolve(&resolve_args).await {
            Ok(diff) => diff,
            Err(ResolveError::NoStagedChanges(_)) => {
                let result = PrecommitResult {
                    ready_to_commit: false,
                    blockers: Vec::new(),
                    warnings: vec!["No staged changes found".to_owned()],
                    session_id: args.session_id.unwrap_or_default(),
                    chunks_reviewed: None,
                };
                return serde_json::to_value(&result)
                    .map_err(|e| BridgeError::unknown(e.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let mut tracker = SessionTracker::new(ctx.store.clone());
        tracker.preflight(args.session_id.as_deref());

        let request = PrecommitRequest {
            diff,
            checklist: args.checklist,
            session_id: args.session_id,
        };
        match ctx.client().review_precommit(request).await {
            Ok(result) => {
                tracker.record_success(&result.session_id, log_entry(&result));
                serde_json::to_value(&result).map_err(|e| BridgeError::unknown(e.to_string()))
            }
            Err(err) => {
                tracker.record_failure();
                Err(err)
            }
        }
    }
}

fn log_entry(result: &PrecommitResult) -> NewReview {
    let verdict = if result.ready_to_commit {
        "ready"
    } else {
        "blocked"
    };
    NewReview {
        session_id: result.session_id.clone(),
        kind: ReviewKind::Precommit,
        verdict: verdict.to_owned(),
        summary: format!(
            "{} blocker(s), {} warning(s)",
            result.blockers.len(),
            result.warnings.len()
        ),
        findings_json: json!({
            "blockers": result.blockers,
            "warnings": result.warnings,
        })
        .to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
