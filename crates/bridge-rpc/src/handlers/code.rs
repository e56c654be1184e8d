//! `review_code` handler.

use async_trait::async_trait;
use bridge_core::types::{CodeReviewResult, ReviewKind};
use bridge_core::BridgeError;
use bridge_engine::client::CodeRequest;
use bridge_store::NewReview;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::RpcContext;
use crate::handlers::parse_args;
use crate::registry::{ToolHandler, ToolSpec};
use crate::tracker::SessionTracker;

#[derive(Deserialize)]
struct CodeArgs {
    diff: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    criteria: Vec<String>,
    #[serde(default)]
    session_id: Option<String>,
}

/// Review a unified diff.
pub struct ReviewCodeHandler;

#[async_trait]
impl ToolHandler for ReviewCodeHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "review_code",
            description: "Review a unified diff and return a structured verdict with \
                          line-anchored findings. Oversized diffs are reviewed in chunks.",
            input_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["diff"],
                "properties": {
                    "diff": { "type": "string", "description": "Unified diff to review" },
                    "context": { "type": "string" },
                    "criteria": { "type": "array", "items": { "type": "string" } },
                    "session_id": { "type": "string" }
                }
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &RpcContext) -> Result<Value, BridgeError> {
        let args: CodeArgs = parse_args(args)?;

        let mut tracker = SessionTracker::new(ctx.store.clone());
        tracker.preflight(args.session_id.as_deref());

        let request = CodeRequest {
            diff: args.diff,
            context: args.context,
            criteria: args.criteria,
            session_id: args.session_id,
        };
        match ctx.client().review_code(request).await {
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

fn log_entry(result: &CodeReviewResult) -> NewReview {
    NewReview {
        session_id: result.session_id.clone(),
        kind: ReviewKind::Code,
        verdict: result.verdict.as_str().to_owned(),
        summary: result.summary.clone(),
        findings_json: serde_json::to_string(&result.findings)
            .unwrap_or_else(|_| "[]".to_owned()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
