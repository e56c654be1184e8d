//! Tool-call response envelope.
//!
//! Every tool result is serialized to a JSON string and wrapped as
//! `{"content":[{"type":"text","text":"…"}]}`; failures add `"isError":true`
//! with the `CODE: message` string as the text.

use bridge_core::BridgeError;
use serde::{Deserialize, Serialize};

/// One content block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ToolContent {
    fn text(text: String) -> Self {
        Self {
            kind: "text".to_owned(),
            text,
        }
    }
}

/// The envelope returned for every tool call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_error: Option<bool>,
}

impl ToolResponse {
    /// Wrap a successful result value.
    pub fn success(value: &serde_json::Value) -> Self {
        Self {
            content: vec![ToolContent::text(value.to_string())],
            is_error: None,
        }
    }

    /// Wrap a taxonomy error.
    #[must_use]
    pub fn error(err: &BridgeError) -> Self {
        Self {
            content: vec![ToolContent::text(err.to_string())],
            is_error: Some(true),
        }
    }

    /// The first content block's text, for assertions and CLI plumbing.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.first().map_or("", |c| c.text.as_str())
    }
}
