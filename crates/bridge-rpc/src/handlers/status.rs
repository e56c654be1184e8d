//! `review_status` handler — read-only session inspection.

use async_trait::async_trait;
use bridge_core::BridgeError;
use bridge_store::{SessionInfo, SessionStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::RpcContext;
use crate::handlers::parse_args;
use crate::registry::{ToolHandler, ToolSpec};

#[derive(Deserialize)]
struct StatusArgs {
    session_id: String,
}

/// Query the lifecycle state of a session.
pub struct ReviewStatusHandler;

#[async_trait]
impl ToolHandler for ReviewStatusHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "review_status",
            description: "Get the status and elapsed time of a review session.",
            input_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["session_id"],
                "properties": {
                    "session_id": { "type": "string" }
                }
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &RpcContext) -> Result<Value, BridgeError> {
        let args: StatusArgs = parse_args(args)?;

        let not_found = json!({ "status": "not_found", "session_id": args.session_id });
        let Some(store) = &ctx.store else {
            return Ok(not_found);
        };
        let Some(info) = store.sessions.lookup(&args.session_id)? else {
            return Ok(not_found);
        };

        let mut response = json!({
            "status": info.status.as_str(),
            "session_id": info.session_id,
        });
        if let Some(elapsed) = compute_elapsed(&info, Utc::now()) {
            response["elapsed_seconds"] = json!(elapsed);
        }
        Ok(response)
    }
}

/// Elapsed seconds for a session, rounded half-up.
///
/// In-progress sessions measure against `now`; finished sessions against
/// `completed_at`, falling back to `now` for legacy rows missing it.
pub(crate) fn compute_elapsed(info: &SessionInfo, now: DateTime<Utc>) -> Option<i64> {
    let created = DateTime::parse_from_rfc3339(&info.created_at).ok()?;
    let end = match info.status {
        SessionStatus::InProgress => now,
        _ => info
            .completed_at
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map_or(now, Into::into),
    };
    let millis = (end - created.with_timezone(&Utc)).num_milliseconds();
    Some((millis + 500).div_euclid(1000))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
