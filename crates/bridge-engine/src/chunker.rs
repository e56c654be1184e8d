//! Diff chunking.
//!
//! Splits a unified diff into size-bounded chunks, preferring file
//! boundaries (`diff --git ` lines) and falling back to hunk boundaries
//! (`@@ ` lines) for files that alone exceed the budget. A single hunk that
//! exceeds the budget is emitted whole — there is no finer split.
//!
//! When every file fits the budget, joining the chunks with `"\n"`
//! reproduces the input byte-for-byte. Hunk-level splits replicate the
//! file header (`diff --git` / `---` / `+++` lines) into each chunk so the
//! reviewer always sees which file a hunk belongs to.

use bridge_core::estimate_tokens;

const FILE_MARKER: &str = "diff --git ";
const HUNK_MARKER: &str = "@@ ";

/// Split `diff` into chunks of at most `max_tokens` estimated tokens.
///
/// - empty or whitespace-only input → no chunks
/// - `max_tokens == 0` → the whole diff as one chunk (budget disabled)
/// - binary/rename entries without hunk markers are never split
#[must_use]
pub fn chunk_diff(diff: &str, max_tokens: usize) -> Vec<String> {
    if diff.trim().is_empty() {
        return Vec::new();
    }
    if max_tokens == 0 {
        return vec![diff.to_owned()];
    }

    let mut pieces: Vec<String> = Vec::new();
    for section in split_at_marker(diff, FILE_MARKER) {
        if estimate_tokens(&section) <= max_tokens {
            pieces.push(section);
        } else {
            pieces.extend(split_file_section(&section, max_tokens));
        }
    }

    pack(pieces, max_tokens)
}

/// Split `text` into sections, each starting at a line with `marker`.
/// Content before the first marker (if any) forms a leading section.
/// Joining the sections with `"\n"` reproduces `text`.
fn split_at_marker(text: &str, marker: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.starts_with(marker) && !current.is_empty() {
            sections.push(current.join("\n"));
            current.clear();
        }
        current.push(line);
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }
    // A leading empty section can only appear for input starting with '\n';
    // keep it so the join identity holds.
    sections
}

/// Split one oversized file section at hunk boundaries.
///
/// The file header (everything before the first `@@ ` line) is replicated
/// into every produced chunk. Zero or one hunk → the section is emitted
/// whole, oversized.
fn split_file_section(section: &str, max_tokens: usize) -> Vec<String> {
    let lines: Vec<&str> = section.split('\n').collect();
    let first_hunk = lines.iter().position(|l| l.starts_with(HUNK_MARKER));

    let Some(first_hunk) = first_hunk else {
        return vec![section.to_owned()];
    };

    let header = lines[..first_hunk].join("\n");
    let hunks = split_at_marker(&lines[first_hunk..].join("\n"), HUNK_MARKER);
    if hunks.len() <= 1 {
        return vec![section.to_owned()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = header.clone();
    let mut current_has_hunk = false;

    for hunk in hunks {
        let candidate = format!("{current}\n{hunk}");
        if current_has_hunk && estimate_tokens(&candidate) > max_tokens {
            chunks.push(current);
            current = format!("{header}\n{hunk}");
        } else {
            current = candidate;
        }
        current_has_hunk = true;
    }
    chunks.push(current);
    chunks
}

/// Greedily bin-pack pieces into output chunks, opening a new chunk when
/// appending the next piece would exceed the budget.
fn pack(pieces: Vec<String>, max_tokens: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for piece in pieces {
        current = Some(match current {
            None => piece,
            Some(open) => {
                let candidate = format!("{open}\n{piece}");
                if estimate_tokens(&candidate) > max_tokens {
                    chunks.push(open);
                    piece
                } else {
                    candidate
                }
            }
        });
    }
    if let Some(open) = current {
        chunks.push(open);
    }
    chunks
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn file_diff(path: &str, hunks: &[&str]) -> String {
        let mut out = format!(
            "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}"
        );
        for hunk in hunks {
            out.push('\n');
            out.push_str(hunk);
        }
        out
    }

    fn hunk(start: u32, body: &str) -> String {
        format!("@@ -{start},2 +{start},3 @@\n context\n-{body}\n+{body} v2")
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_diff("", 100).is_empty());
        assert!(chunk_diff("   \n\t\n", 100).is_empty());
    }

    #[test]
    fn zero_budget_returns_whole_diff() {
        let diff = file_diff("a.rs", &[&hunk(1, "x")]);
        assert_eq!(chunk_diff(&diff, 0), vec![diff]);
    }

    #[test]
    fn small_diff_is_one_chunk() {
        let diff = file_diff("a.rs", &[&hunk(1, "x")]);
        let chunks = chunk_diff(&diff, 10_000);
        assert_eq!(chunks, vec![diff]);
    }

    #[test]
    fn join_identity_at_file_granularity() {
        let diff = format!(
            "{}\n{}\n{}",
            file_diff("a.rs", &[&hunk(1, "alpha"), &hunk(40, "beta")]),
            file_diff("b.rs", &[&hunk(3, "gamma")]),
            file_diff("c.rs", &[&hunk(9, "delta")]),
        );
        // budget below the total but above each single file
        let per_file = estimate_tokens(&file_diff("a.rs", &[&hunk(1, "alpha"), &hunk(40, "beta")]));
        let chunks = chunk_diff(&diff, per_file + 10);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.join("\n"), diff);
    }

    #[test]
    fn every_chunk_starts_with_file_marker() {
        let diff = format!(
            "{}\n{}",
            file_diff("a.rs", &[&hunk(1, "alpha")]),
            file_diff("b.rs", &[&hunk(2, "beta")]),
        );
        for budget in [5, 20, 50, 500] {
            for chunk in chunk_diff(&diff, budget) {
                assert!(
                    chunk.starts_with("diff --git "),
                    "budget {budget}: chunk {chunk:?}"
                );
            }
        }
    }

    #[test]
    fn oversized_file_splits_at_hunks_with_header_replicated() {
        let h1 = hunk(1, &"a".repeat(200));
        let h2 = hunk(90, &"b".repeat(200));
        let diff = file_diff("big.rs", &[&h1, &h2]);
        // force the file over budget but each header+hunk under it
        let budget = estimate_tokens(&diff) - 10;
        let chunks = chunk_diff(&diff, budget);
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert!(chunk.starts_with("diff --git a/big.rs"));
            assert!(chunk.contains("+++ b/big.rs"));
        }
        assert!(chunks[0].contains(&"a".repeat(200)));
        assert!(chunks[1].contains(&"b".repeat(200)));
    }

    #[test]
    fn single_oversized_hunk_is_emitted_whole() {
        let big = hunk(1, &"x".repeat(4000));
        let diff = file_diff("big.rs", &[&big]);
        let chunks = chunk_diff(&diff, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], diff);
    }

    #[test]
    fn binary_diff_without_hunks_is_never_split() {
        let diff = format!(
            "diff --git a/img.png b/img.png\n{}\nBinary files a/img.png and b/img.png differ",
            "index 111..222 100644"
        );
        let chunks = chunk_diff(&diff, 5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], diff);
    }

    #[test]
    fn two_small_files_pack_into_one_chunk() {
        let a = file_diff("a.rs", &[&hunk(1, "x")]);
        let b = file_diff("b.rs", &[&hunk(2, "y")]);
        let diff = format!("{a}\n{b}");
        let chunks = chunk_diff(&diff, 10_000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], diff);
    }

    #[test]
    fn preamble_before_first_header_is_preserved() {
        let body = file_diff("a.rs", &[&hunk(1, "x")]);
        let diff = format!("Some preamble text\n{body}");
        let chunks = chunk_diff(&diff, 10_000);
        assert_eq!(chunks.join("\n"), diff);
    }

    #[test]
    fn split_at_marker_round_trips() {
        let text = "pre\ndiff --git a\nbody\ndiff --git b\nmore";
        let sections = split_at_marker(text, FILE_MARKER);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections.join("\n"), text);
    }
}
