//! # bridge-engine
//!
//! The review engine: everything between raw user input and a structured,
//! merged review result.
//!
//! Pipeline for one request:
//!
//! ```text
//! input → (diff resolver) → chunker → prompt builder → reviewer client
//!       → output validation (→ one retry) → result merger
//! ```
//!
//! - [`chunker`]: split a unified diff into size-bounded pieces at file,
//!   then hunk, boundaries
//! - [`prompt`]: tamper-resistant prompt assembly for the three review kinds
//! - [`schema`]: JSON output schemas and narrowing of model output into
//!   typed outcomes
//! - [`sdk`]: the vendor SDK boundary (trait seam plus the `codex` CLI
//!   implementation)
//! - [`client`]: thread lifecycle, per-turn deadlines, retry, chunk
//!   orchestration
//! - [`merge`]: verdict precedence and finding deduplication
//! - [`resolver`]: staged-diff resolution through git

#![deny(unsafe_code)]

pub mod chunker;
pub mod client;
pub mod merge;
pub mod prompt;
pub mod resolver;
pub mod schema;
pub mod sdk;

#[doc(hidden)]
pub mod testing;

pub use client::{CodeRequest, PlanRequest, PrecommitRequest, ReviewerClient};
pub use resolver::{DiffResolver, ResolveArgs, ResolveError};
