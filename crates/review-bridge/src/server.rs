//! Stdio tool-call server.
//!
//! JSON-RPC 2.0, one request per line on stdin, one response per line on
//! stdout. Three methods: `initialize`, `tools/list`, and `tools/call`.
//! Requests without an id are notifications and get no response. Logging
//! stays on stderr — stdout carries only protocol frames.

use std::sync::Arc;

use bridge_rpc::{RpcContext, ToolRegistry};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serve the tool-call protocol until stdin closes.
pub async fn run(ctx: RpcContext) -> anyhow::Result<()> {
    let ctx = Arc::new(ctx);
    let registry = Arc::new(ToolRegistry::with_default_tools());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: Value = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "unparseable request line");
                let response = json!({
                    "jsonrpc": "2.0",
                    "id": null,
                    "error": { "code": -32700, "message": "parse error" }
                });
                write_line(&mut stdout, &response).await?;
                continue;
            }
        };
        if let Some(response) = handle_request(request, &registry, &ctx).await {
            write_line(&mut stdout, &response).await?;
        }
    }
    debug!("stdin closed, server exiting");
    Ok(())
}

async fn write_line(stdout: &mut tokio::io::Stdout, value: &Value) -> std::io::Result<()> {
    stdout.write_all(value.to_string().as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

/// Handle one request; `None` for notifications.
pub async fn handle_request(
    request: Value,
    registry: &ToolRegistry,
    ctx: &Arc<RpcContext>,
) -> Option<Value> {
    let id = request.get("id").cloned();
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");

    // Notifications (no id) are acknowledged silently.
    let id = match id {
        Some(id) if !id.is_null() => id,
        _ => {
            debug!(method, "notification");
            return None;
        }
    };

    let result = match method {
        "initialize" => json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "review-bridge",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": { "tools": {} }
        }),
        "tools/list" => json!({ "tools": registry.list() }),
        "tools/call" => {
            let params = request.get("params").cloned().unwrap_or(Value::Null);
            let name = params.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));
            let response = registry.call(name, arguments, Arc::clone(ctx)).await;
            serde_json::to_value(response).unwrap_or_else(|_| json!(null))
        }
        other => {
            return Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("method '{other}' not found") }
            }));
        }
    };

    Some(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
