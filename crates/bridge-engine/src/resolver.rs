//! Staged-diff resolution.
//!
//! Contract: an explicit `diff` wins, even when empty (an empty explicit
//! diff is the no-staged-changes sentinel, not an invitation to call git).
//! With `auto_diff` enabled and no explicit diff, the staged diff is read
//! via `git diff --cached`; an empty result is the sentinel, a failed
//! invocation is a `GIT_ERROR`.

use std::path::PathBuf;
use std::process::Stdio;

use bridge_core::BridgeError;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Environment variable overriding the git binary.
pub const GIT_BIN_ENV: &str = "REVIEW_BRIDGE_GIT";

/// Arguments to diff resolution.
#[derive(Clone, Debug)]
pub struct ResolveArgs {
    /// Explicit diff supplied by the caller; wins over auto-detection.
    pub diff: Option<String>,
    /// Whether git auto-detection is allowed (defaults to true upstream).
    pub auto_diff: bool,
}

/// Why a diff could not be resolved.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing is staged (or the explicit diff was empty).
    #[error("NO_STAGED_CHANGES: {0}")]
    NoStagedChanges(String),

    /// git could not be invoked or exited non-zero.
    #[error("{0}")]
    Git(String),

    /// Auto-detection disabled and no explicit diff given.
    #[error("auto_diff disabled and no diff provided")]
    AutoDiffDisabled,
}

impl From<ResolveError> for BridgeError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoStagedChanges(msg) => {
                BridgeError::git(format!("NO_STAGED_CHANGES: {msg}"))
            }
            ResolveError::Git(msg) => BridgeError::git(msg),
            ResolveError::AutoDiffDisabled => BridgeError::unknown(err.to_string()),
        }
    }
}

/// Resolves the diff a precommit review runs against.
#[derive(Clone, Debug)]
pub struct DiffResolver {
    git_binary: PathBuf,
}

impl Default for DiffResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffResolver {
    /// Resolve the git binary from `REVIEW_BRIDGE_GIT` or PATH.
    #[must_use]
    pub fn new() -> Self {
        let git_binary = std::env::var(GIT_BIN_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("git"));
        Self { git_binary }
    }

    /// Use an explicit git binary (tests, sandboxes).
    pub fn with_git(binary: impl Into<PathBuf>) -> Self {
        Self {
            git_binary: binary.into(),
        }
    }

    /// Resolve a diff per the precommit contract.
    pub async fn resolve(&self, args: &ResolveArgs) -> Result<String, ResolveError> {
        if let Some(diff) = &args.diff {
            if diff.trim().is_empty() {
                return Err(ResolveError::NoStagedChanges(
                    "provided diff is empty".to_owned(),
                ));
            }
            return Ok(diff.clone());
        }

        if !args.auto_diff {
            return Err(ResolveError::AutoDiffDisabled);
        }

        self.staged_diff().await
    }

    /// Read the staged diff via `git diff --cached`.
    async fn staged_diff(&self) -> Result<String, ResolveError> {
        debug!(git = ?self.git_binary, "reading staged diff");
        let output = Command::new(&self.git_binary)
            .args(["diff", "--cached"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ResolveError::Git(format!("failed to invoke git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::Git(format!(
                "git diff --cached failed: {}",
                stderr.trim()
            )));
        }

        let diff = String::from_utf8_lossy(&output.stdout).into_owned();
        if diff.trim().is_empty() {
            return Err(ResolveError::NoStagedChanges(
                "no staged changes found".to_owned(),
            ));
        }
        Ok(diff)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args(diff: Option<&str>, auto_diff: bool) -> ResolveArgs {
        ResolveArgs {
            diff: diff.map(ToOwned::to_owned),
            auto_diff,
        }
    }

    #[tokio::test]
    async fn explicit_diff_wins_without_git() {
        // A binary that cannot exist; explicit diff must never reach it.
        let resolver = DiffResolver::with_git("/nonexistent/git");
        let diff = resolver
            .resolve(&args(Some("diff --git a/x b/x"), true))
            .await
            .unwrap();
        assert_eq!(diff, "diff --git a/x b/x");
    }

    #[tokio::test]
    async fn empty_explicit_diff_is_sentinel() {
        let resolver = DiffResolver::with_git("/nonexistent/git");
        let err = resolver.resolve(&args(Some("  \n"), true)).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoStagedChanges(_)));
        assert!(err.to_string().starts_with("NO_STAGED_CHANGES: "));
    }

    #[tokio::test]
    async fn auto_diff_disabled_without_diff() {
        let resolver = DiffResolver::with_git("/nonexistent/git");
        let err = resolver.resolve(&args(None, false)).await.unwrap_err();
        assert_eq!(err, ResolveError::AutoDiffDisabled);
        assert_eq!(err.to_string(), "auto_diff disabled and no diff provided");
    }

    #[tokio::test]
    async fn unspawnable_git_is_git_error() {
        let resolver = DiffResolver::with_git("/nonexistent/git");
        let err = resolver.resolve(&args(None, true)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Git(_)));
        assert!(err.to_string().contains("failed to invoke git"));
    }

    #[cfg(unix)]
    mod with_fake_git {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        fn fake_git(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("git");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn staged_diff_is_returned() {
            let dir = tempfile::tempdir().unwrap();
            let git = fake_git(dir.path(), "echo 'diff --git a/f b/f'");
            let resolver = DiffResolver::with_git(git);
            let diff = resolver.resolve(&args(None, true)).await.unwrap();
            assert_eq!(diff, "diff --git a/f b/f\n");
        }

        #[tokio::test]
        async fn empty_staged_diff_is_sentinel() {
            let dir = tempfile::tempdir().unwrap();
            let git = fake_git(dir.path(), "exit 0");
            let resolver = DiffResolver::with_git(git);
            let err = resolver.resolve(&args(None, true)).await.unwrap_err();
            assert!(matches!(err, ResolveError::NoStagedChanges(_)));
        }

        #[tokio::test]
        async fn nonzero_exit_is_git_error_with_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let git = fake_git(dir.path(), "echo 'fatal: not a git repository' >&2\nexit 128");
            let resolver = DiffResolver::with_git(git);
            let err = resolver.resolve(&args(None, true)).await.unwrap_err();
            assert!(err.to_string().contains("not a git repository"));
        }
    }

    #[test]
    fn sentinel_converts_to_git_error_code() {
        use bridge_core::ErrorCode;
        let err: BridgeError =
            ResolveError::NoStagedChanges("no staged changes found".into()).into();
        assert_eq!(err.code, ErrorCode::GitError);
        assert!(err.message.starts_with("NO_STAGED_CHANGES: "));
    }
}
