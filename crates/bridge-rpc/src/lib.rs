//! # bridge-rpc
//!
//! The request-handling layer between a transport (stdio tool-call server
//! or CLI) and the review engine:
//!
//! - [`tracker`]: couples one request's lifecycle to session-store mutations
//! - [`handlers`]: one handler per tool (`review_plan`, `review_code`,
//!   `review_precommit`, `review_status`, `review_history`)
//! - [`registry`]: name → handler dispatch with per-tool input schemas
//! - [`types`]: the `{content, isError}` response envelope
//!
//! Handlers return errors as values from the closed taxonomy; the registry
//! wraps both successes and failures into the tool-call envelope. Storage
//! failures never turn a successful review into a failure — the tracker
//! logs and swallows them.

#![deny(unsafe_code)]

pub mod context;
pub mod handlers;
pub mod registry;
pub mod tracker;
pub mod types;

pub use context::RpcContext;
pub use registry::{ToolHandler, ToolRegistry, ToolSpec};
pub use tracker::SessionTracker;
pub use types::{ToolContent, ToolResponse};
