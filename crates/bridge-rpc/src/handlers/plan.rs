//! `review_plan` handler.

use async_trait::async_trait;
use bridge_core::types::{PlanReviewResult, ReviewKind};
use bridge_core::BridgeError;
use bridge_engine::client::PlanRequest;
use bridge_settings::PlanDepth;
use bridge_store::NewReview;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::RpcContext;
use crate::handlers::parse_args;
use crate::registry::{ToolHandler, ToolSpec};
use crate::tracker::SessionTracker;

#[derive(Deserialize)]
struct PlanArgs {
    plan: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    focus: Vec<String>,
    #[serde(default)]
    depth: Option<PlanDepth>,
    #[serde(default)]
    session_id: Option<String>,
}

/// Review an implementation plan.
pub struct ReviewPlanHandler;

#[async_trait]
impl ToolHandler for ReviewPlanHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "review_plan",
            description: "Review an implementation plan and return a structured verdict \
                          with findings.",
            input_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["plan"],
                "properties": {
                    "plan": { "type": "string", "description": "The plan text to review" },
                    "context": { "type": "string" },
                    "focus": { "type": "array", "items": { "type": "string" } },
                    "depth": { "type": "string", "enum": ["quick", "thorough"] },
                    "session_id": { "type": "string" }
                }
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &RpcContext) -> Result<Value, BridgeError> {
        let args: PlanArgs = parse_args(args)?;

        let mut tracker = SessionTracker::new(ctx.store.clone());
        tracker.preflight(args.session_id.as_deref());

        let request = PlanRequest {
            plan: args.plan,
            context: args.context,
            focus: args.focus,
            depth: args.depth,
            session_id: args.session_id,
        };
        match ctx.client().review_plan(request).await {
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

fn log_entry(result: &PlanReviewResult) -> NewReview {
    NewReview {
        session_id: result.session_id.clone(),
        kind: ReviewKind::Plan,
        verdict: result.verdict.as_str().to_owned(),
        summary: result.summary.clone(),
        findings_json: serde_json::to_string(&result.findings)
            .unwrap_or_else(|_| "[]".to_owned()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
