//! # review-bridge
//!
//! Binary crate: the argv router, the stdio tool-call server, and the
//! terminal CLI. All review semantics live in the library crates; this
//! crate is wiring, I/O, and presentation.

#![deny(unsafe_code)]

pub mod cli;
pub mod format;
pub mod input;
pub mod server;

use std::sync::Arc;

use bridge_engine::sdk::codex::CodexCliSdk;
use bridge_engine::DiffResolver;
use bridge_rpc::RpcContext;
use bridge_settings::BridgeConfig;
use bridge_store::Store;
use tracing::warn;

/// Environment variable naming the database file.
pub const DB_ENV: &str = "REVIEW_BRIDGE_DB";
/// Default database file, relative to the cwd.
pub const DEFAULT_DB: &str = "reviews.db";

/// Build the shared request context: store (with in-memory fallback), SDK
/// handle, and diff resolver.
pub fn build_context(config: BridgeConfig) -> anyhow::Result<RpcContext> {
    let db_path = std::env::var(DB_ENV).unwrap_or_else(|_| DEFAULT_DB.to_owned());
    let store = match Store::open_or_memory(&db_path) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(%err, "store unavailable, session tracking disabled");
            None
        }
    };
    let sdk = CodexCliSdk::new().map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(RpcContext::new(
        config,
        store,
        Arc::new(sdk),
        DiffResolver::new(),
    ))
}

/// Initialize the tracing subscriber: compact output on stderr, `RUST_LOG`
/// respected, `warn` by default.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Whether the argv selects CLI mode: any positional (non-flag) argument.
///
/// A stdio server must never sit silently on an argv that was meant as a
/// command, so an unknown positional routes to the CLI parser and its
/// error reporting.
#[must_use]
pub fn is_cli_invocation(args: &[String]) -> bool {
    args.iter().any(|a| !a.starts_with('-') || a == "--help" || a == "--version")
}
