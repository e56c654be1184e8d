//! `review_history` handler — read-only review log queries.

use async_trait::async_trait;
use bridge_core::BridgeError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::RpcContext;
use crate::handlers::parse_args;
use crate::registry::{ToolHandler, ToolSpec};

const DEFAULT_LAST_N: usize = 10;

#[derive(Deserialize)]
struct HistoryArgs {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    last_n: Option<usize>,
}

/// Query past reviews, by session or most-recent-first.
pub struct ReviewHistoryHandler;

#[async_trait]
impl ToolHandler for ReviewHistoryHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "review_history",
            description: "List past reviews, either for one session or the most recent \
                          across all sessions.",
            input_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "session_id": { "type": "string" },
                    "last_n": { "type": "integer", "minimum": 1 }
                }
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &RpcContext) -> Result<Value, BridgeError> {
        let args: HistoryArgs = parse_args(args)?;

        let Some(store) = &ctx.store else {
            return Ok(json!({ "reviews": [] }));
        };
        let reviews = match args.session_id.as_deref() {
            Some(id) => store.reviews.by_session(id)?,
            None => store.reviews.recent(args.last_n.unwrap_or(DEFAULT_LAST_N))?,
        };
        Ok(json!({ "reviews": reviews }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_helpers::make_test_context;
    use bridge_core::types::ReviewKind;
    use bridge_store::NewReview;

    fn seed(ctx: &RpcContext, session: &str, verdict: &str) {
        ctx.store
            .as_ref()
            .unwrap()
            .reviews
            .save(&NewReview {
                session_id: session.to_owned(),
                kind: ReviewKind::Plan,
                verdict: verdict.to_owned(),
                summary: "s".to_owned(),
                findings_json: "[]".to_owned(),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn by_session_returns_oldest_first() {
        let ctx = make_test_context();
        seed(&ctx, "a", "approve");
        seed(&ctx, "a", "revise");
        seed(&ctx, "b", "approve");

        let value = ReviewHistoryHandler
            .call(json!({"session_id": "a"}), &ctx)
            .await
            .unwrap();
        let reviews = value["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0]["verdict"], "approve");
        assert_eq!(reviews[1]["verdict"], "revise");
        assert_eq!(reviews[0]["type"], "plan");
    }

    #[tokio::test]
    async fn unknown_session_returns_empty_list() {
        let ctx = make_test_context();
        let value = ReviewHistoryHandler
            .call(json!({"session_id": "nobody"}), &ctx)
            .await
            .unwrap();
        assert!(value["reviews"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_defaults_to_ten_newest_first() {
        let ctx = make_test_context();
        for i in 0..12 {
            seed(&ctx, "s", &format!("v{i}"));
        }
        let value = ReviewHistoryHandler.call(json!({}), &ctx).await.unwrap();
        let reviews = value["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 10);
        assert_eq!(reviews[0]["verdict"], "v11");
    }

    #[tokio::test]
    async fn last_n_limits_results() {
        let ctx = make_test_context();
        for i in 0..5 {
            seed(&ctx, "s", &format!("v{i}"));
        }
        let value = ReviewHistoryHandler
            .call(json!({"last_n": 2}), &ctx)
            .await
            .unwrap();
        assert_eq!(value["reviews"].as_array().unwrap().len(), 2);
    }
}
