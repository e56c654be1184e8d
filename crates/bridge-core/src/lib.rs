//! # bridge-core
//!
//! Shared foundation for the review-bridge workspace:
//!
//! - [`errors`]: the closed error taxonomy surfaced as `CODE: message`
//!   strings, plus the vendor-error classifier
//! - [`types`]: review kinds, per-kind severity/verdict enums, findings,
//!   and the three structured result shapes
//! - [`tokens`]: the coarse token estimate used for diff budgeting
//!
//! Everything here is transport- and storage-agnostic; the heavier crates
//! (`bridge-engine`, `bridge-store`, `bridge-rpc`) build on these types.

#![deny(unsafe_code)]

pub mod errors;
pub mod tokens;
pub mod types;

pub use errors::{BridgeError, ErrorCode, Result};
pub use tokens::estimate_tokens;
pub use types::{
    CodeFinding, CodeReviewResult, CodeSeverity, CodeVerdict, Finding, PlanFinding,
    PlanReviewResult, PlanSeverity, PlanVerdict, PrecommitResult, ReviewKind,
};
