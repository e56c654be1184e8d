//! Tool registry and dispatch.
//!
//! Maps tool names to handlers, serves the per-tool input schemas for
//! `tools/list`, and wraps every outcome in the tool-call envelope. A
//! handler panic is caught at this boundary and surfaced as
//! `UNKNOWN_ERROR` instead of taking the server down.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::BridgeError;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::context::RpcContext;
use crate::types::ToolResponse;

/// Static description of one tool.
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema over the tool's argument object.
    pub input_schema: Value,
}

/// Trait implemented by every tool handler.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name, description, and input schema.
    fn spec(&self) -> ToolSpec;

    /// Execute the tool. Errors are taxonomy values; the registry wraps
    /// them into the envelope.
    async fn call(&self, args: Value, ctx: &RpcContext) -> Result<Value, BridgeError>;
}

/// Registry mapping tool names to handlers.
pub struct ToolRegistry {
    order: Vec<&'static str>,
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Registry with the five review tools registered.
    #[must_use]
    pub fn with_default_tools() -> Self {
        use crate::handlers;
        let mut registry = Self::new();
        registry.register(handlers::plan::ReviewPlanHandler);
        registry.register(handlers::code::ReviewCodeHandler);
        registry.register(handlers::precommit::ReviewPrecommitHandler);
        registry.register(handlers::status::ReviewStatusHandler);
        registry.register(handlers::history::ReviewHistoryHandler);
        registry
    }

    /// Register a handler under its spec name.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) {
        let name = handler.spec().name;
        if self.handlers.insert(name, Arc::new(handler)).is_none() {
            self.order.push(name);
        }
    }

    /// Tool descriptions for `tools/list`, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|handler| {
                let spec = handler.spec();
                json!({
                    "name": spec.name,
                    "description": spec.description,
                    "inputSchema": spec.input_schema,
                })
            })
            .collect()
    }

    /// Whether a tool is registered.
    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Dispatch a tool call, producing the response envelope.
    pub async fn call(&self, name: &str, args: Value, ctx: Arc<RpcContext>) -> ToolResponse {
        let Some(handler) = self.handlers.get(name) else {
            warn!(tool = name, "unknown tool requested");
            return ToolResponse::error(&BridgeError::unknown(format!("unknown tool '{name}'")));
        };

        let handler = Arc::clone(handler);
        let task = tokio::spawn(async move { handler.call(args, &ctx).await });

        match task.await {
            Ok(Ok(value)) => ToolResponse::success(&value),
            Ok(Err(err)) => ToolResponse::error(&err),
            Err(join_err) => {
                error!(tool = name, %join_err, "tool handler panicked");
                ToolResponse::error(&BridgeError::unknown(format!(
                    "handler for '{name}' failed unexpectedly"
                )))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
