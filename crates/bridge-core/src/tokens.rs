//! Coarse token estimation.
//!
//! The chunk budget math does not need tokenizer-exact counts; a fixed
//! bytes-per-token ratio keeps the estimate deterministic and dependency-free.
//! Downstream budgets reserve headroom for prompt scaffolding on top of this.

/// Estimated token count for a string: `ceil(len / 4)`, 0 for empty.
#[must_use]
pub fn estimate_tokens(s: &str) -> usize {
    s.len().div_ceil(4)
}
