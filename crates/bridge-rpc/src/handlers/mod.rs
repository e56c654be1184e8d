//! Tool handlers, one module per tool.

pub mod code;
pub mod history;
pub mod plan;
pub mod precommit;
pub mod status;

use bridge_core::BridgeError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize a tool's argument object, mapping failures onto the
/// taxonomy (argument validation is not a distinct error class).
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, BridgeError> {
    serde_json::from_value(args).map_err(|e| BridgeError::unknown(format!("invalid arguments: {e}")))
}
