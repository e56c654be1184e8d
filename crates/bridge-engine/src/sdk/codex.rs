//! `codex` CLI implementation of the SDK boundary.
//!
//! Each turn is one `codex exec --json` invocation with the prompt on
//! stdin and the output schema in a temp file. The JSONL event stream on
//! stdout carries the thread id (`thread.started`) and the final agent
//! message (`item.completed` with an `agent_message` item). Resuming a
//! thread maps to `codex exec resume <id>`.
//!
//! Cancellation: the child is spawned with `kill_on_drop`, and the drive
//! future is dropped when the cancel token fires, so an expired deadline
//! reaps the subprocess and surfaces an `AbortError`-shaped failure.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::debug;

use async_trait::async_trait;
use serde_json::Value;

use super::{ReviewerSdk, ReviewerThread, SdkError, SdkResult, ThreadOptions, TurnOptions, TurnOutput};

/// Environment variable overriding the `codex` binary path.
pub const CODEX_BIN_ENV: &str = "REVIEW_BRIDGE_CODEX_BIN";

// ─────────────────────────────────────────────────────────────────────────────
// Sdk
// ─────────────────────────────────────────────────────────────────────────────

/// SDK handle backed by the `codex` CLI.
#[derive(Clone, Debug)]
pub struct CodexCliSdk {
    binary: PathBuf,
}

impl CodexCliSdk {
    /// Create a handle, resolving the binary from `REVIEW_BRIDGE_CODEX_BIN`
    /// or falling back to `codex` on PATH.
    pub fn new() -> SdkResult<Self> {
        let binary = std::env::var(CODEX_BIN_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("codex"));
        if binary.as_os_str().is_empty() {
            return Err(SdkError::new(format!("{CODEX_BIN_ENV} is set but empty")));
        }
        Ok(Self { binary })
    }

    /// Create a handle with an explicit binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ReviewerSdk for CodexCliSdk {
    async fn start_thread(&self, opts: &ThreadOptions) -> SdkResult<Box<dyn ReviewerThread>> {
        Ok(Box::new(CodexThread {
            binary: self.binary.clone(),
            opts: opts.clone(),
            id: None,
        }))
    }

    async fn resume_thread(
        &self,
        id: &str,
        opts: &ThreadOptions,
    ) -> SdkResult<Box<dyn ReviewerThread>> {
        Ok(Box::new(CodexThread {
            binary: self.binary.clone(),
            opts: opts.clone(),
            id: Some(id.to_owned()),
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Thread
// ─────────────────────────────────────────────────────────────────────────────

struct CodexThread {
    binary: PathBuf,
    opts: ThreadOptions,
    /// Known thread id: the resume target, or the id reported by the first
    /// turn of a fresh thread.
    id: Option<String>,
}

impl CodexThread {
    fn build_command(&self, schema_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("exec");
        if let Some(id) = &self.id {
            cmd.arg("resume").arg(id);
        }
        cmd.arg("--json");
        cmd.arg("--sandbox").arg(&self.opts.sandbox_mode);
        if self.opts.skip_git_repo_check {
            cmd.arg("--skip-git-repo-check");
        }
        cmd.arg("--model").arg(&self.opts.model);
        cmd.arg("-c").arg(format!(
            "model_reasoning_effort=\"{}\"",
            self.opts.reasoning_effort
        ));
        cmd.arg("--output-schema").arg(schema_path);
        cmd.arg("-");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ReviewerThread for CodexThread {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    async fn run(&mut self, prompt: &str, opts: &TurnOptions) -> SdkResult<TurnOutput> {
        let schema_file = tempfile::NamedTempFile::new()
            .map_err(|e| SdkError::new(format!("cannot create schema file: {e}")))?;
        std::fs::write(
            schema_file.path(),
            serde_json::to_vec(&opts.output_schema)
                .map_err(|e| SdkError::new(format!("cannot serialize output schema: {e}")))?,
        )
        .map_err(|e| SdkError::new(format!("cannot write schema file: {e}")))?;

        let child = self
            .build_command(schema_file.path())
            .spawn()
            .map_err(|e| SdkError::new(format!("failed to spawn {:?}: {e}", self.binary)))?;

        let work = drive(child, prompt.to_owned());
        tokio::pin!(work);
        let outcome = tokio::select! {
            res = &mut work => res?,
            () = opts.cancel.cancelled() => {
                debug!("codex turn cancelled, killing subprocess");
                return Err(SdkError::aborted());
            }
        };

        if let Some(thread_id) = outcome.thread_id {
            self.id = Some(thread_id);
        }
        Ok(TurnOutput {
            final_response: outcome.final_response,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subprocess driving
// ─────────────────────────────────────────────────────────────────────────────

struct DriveOutcome {
    thread_id: Option<String>,
    final_response: String,
}

async fn drive(mut child: Child, prompt: String) -> SdkResult<DriveOutcome> {
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| SdkError::new("codex stdin not piped"))?;
    stdin
        .write_all(prompt.as_bytes())
        .await
        .map_err(|e| SdkError::new(format!("failed to write prompt: {e}")))?;
    drop(stdin);

    // Drain stderr concurrently so a chatty child cannot block on the pipe.
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| SdkError::new("codex stderr not piped"))?;
    let stderr_task = tokio::spawn(async move {
        let mut buf = String::new();
        let _ = stderr.read_to_string(&mut buf).await;
        buf
    });

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SdkError::new("codex stdout not piped"))?;
    let mut lines = BufReader::new(stdout).lines();

    let mut thread_id: Option<String> = None;
    let mut final_response: Option<String> = None;
    let mut stream_error: Option<String> = None;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| SdkError::new(format!("failed to read codex output: {e}")))?
    {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        match event["type"].as_str() {
            Some("thread.started") => {
                thread_id = event["thread_id"].as_str().map(ToOwned::to_owned);
            }
            Some("item.completed") => {
                if event["item"]["type"].as_str() == Some("agent_message") {
                    final_response = event["item"]["text"].as_str().map(ToOwned::to_owned);
                }
            }
            Some("error") => {
                stream_error = event["message"].as_str().map(ToOwned::to_owned);
            }
            _ => {}
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| SdkError::new(format!("failed to wait for codex: {e}")))?;
    let stderr_text = stderr_task.await.unwrap_or_default();

    if let Some(message) = stream_error {
        return Err(SdkError::new(message));
    }
    if !status.success() {
        let detail = if stderr_text.trim().is_empty() {
            format!("codex exec exited with {status}")
        } else {
            stderr_text.trim().to_owned()
        };
        return Err(SdkError::new(detail));
    }

    let final_response =
        final_response.ok_or_else(|| SdkError::new("codex exec produced no agent message"))?;
    Ok(DriveOutcome {
        thread_id,
        final_response,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
