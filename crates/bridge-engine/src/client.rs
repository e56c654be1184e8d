//! Reviewer client — thread lifecycle, turns, retry, and chunk orchestration.
//!
//! One client serves one request. It owns the SDK handle, starts or resumes
//! the reviewer thread, runs each turn under a per-turn deadline, repairs
//! malformed output with a single same-prompt retry, and merges multi-chunk
//! results.
//!
//! Multi-chunk reviews are strictly sequential on one thread: the first
//! chunk starts (or resumes) the thread, every later chunk resumes the id
//! reported by the previous one, so the reviewer sees the chunks in order.
//! The deadline resets per chunk, so an N-chunk review is bounded by
//! `N × timeout_seconds` of wall clock.

use std::sync::Arc;
use std::time::Duration;

use bridge_core::errors::classify;
use bridge_core::types::{
    CodeReviewResult, CodeVerdict, PlanReviewResult, PrecommitResult,
};
use bridge_core::{estimate_tokens, BridgeError, Result};
use bridge_settings::{BridgeConfig, PlanDepth};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::chunker::chunk_diff;
use crate::merge::{merge_code, merge_precommit};
use crate::prompt::{build_code_prompt, build_plan_prompt, build_precommit_prompt, ChunkProgress};
use crate::schema::{
    code_schema, plan_schema, precommit_schema, validate_code, validate_plan, validate_precommit,
};
use crate::sdk::{ReviewerSdk, ReviewerThread, SdkError, ThreadOptions, TurnOptions};

/// Tokens reserved for prompt scaffolding around the diff payload.
const FIXED_PROMPT_OVERHEAD: usize = 2000;
/// Floor for the diff budget, whatever the overhead math says.
const MIN_DIFF_BUDGET: usize = 500;

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Input to a plan review.
#[derive(Clone, Debug, Default)]
pub struct PlanRequest {
    pub plan: String,
    pub context: Option<String>,
    /// Empty → config default.
    pub focus: Vec<String>,
    /// `None` → config default.
    pub depth: Option<PlanDepth>,
    pub session_id: Option<String>,
}

/// Input to a code review.
#[derive(Clone, Debug, Default)]
pub struct CodeRequest {
    pub diff: String,
    pub context: Option<String>,
    /// Empty → config default.
    pub criteria: Vec<String>,
    pub session_id: Option<String>,
}

/// Input to a precommit review (diff already resolved).
#[derive(Clone, Debug, Default)]
pub struct PrecommitRequest {
    pub diff: String,
    pub checklist: Vec<String>,
    pub session_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Request-scoped reviewer client.
pub struct ReviewerClient {
    sdk: Arc<dyn ReviewerSdk>,
    config: BridgeConfig,
}

impl ReviewerClient {
    pub fn new(sdk: Arc<dyn ReviewerSdk>, config: BridgeConfig) -> Self {
        Self { sdk, config }
    }

    fn thread_options(&self) -> ThreadOptions {
        ThreadOptions::new(
            self.config.model_name.clone(),
            self.config.reasoning_effort.as_str(),
        )
    }

    fn classify_sdk(&self, err: SdkError) -> BridgeError {
        if classify::is_cancellation(err.name.as_deref(), &err.message) {
            BridgeError::timeout(self.config.timeout_seconds)
        } else {
            classify::classify(
                &err.message,
                &self.config.model_name,
                self.config.timeout_seconds,
            )
        }
    }

    /// Start a fresh thread, or resume when a session id is given.
    async fn acquire(&self, session_id: Option<&str>) -> Result<Box<dyn ReviewerThread>> {
        let opts = self.thread_options();
        match session_id {
            Some(id) => self.sdk.resume_thread(id, &opts).await.map_err(|err| {
                BridgeError::session_not_found(format!(
                    "cannot resume session '{id}': {}",
                    err.message
                ))
            }),
            None => self
                .sdk
                .start_thread(&opts)
                .await
                .map_err(|err| self.classify_sdk(err)),
        }
    }

    /// Run one turn with the per-turn deadline, retrying the same prompt on
    /// the same thread once when the response fails to parse or validate.
    async fn run_turn<T>(
        &self,
        thread: &mut Box<dyn ReviewerThread>,
        prompt: &str,
        schema: &Value,
        validate: impl Fn(Value) -> std::result::Result<T, String>,
    ) -> Result<T> {
        let mut last_error = String::new();
        for attempt in 1..=2 {
            let token = CancellationToken::new();
            let opts = TurnOptions {
                output_schema: schema.clone(),
                cancel: token.clone(),
            };
            let run = thread.run(prompt, &opts);
            tokio::pin!(run);
            let result = tokio::select! {
                res = &mut run => res,
                () = tokio::time::sleep(Duration::from_secs(self.config.timeout_seconds)) => {
                    token.cancel();
                    run.await
                }
            };

            let output = result.map_err(|err| self.classify_sdk(err))?;
            let value = match serde_json::from_str::<Value>(&output.final_response) {
                Ok(value) => value,
                Err(_) => {
                    last_error = "malformed JSON in response".to_owned();
                    debug!(attempt, "reviewer returned malformed JSON");
                    continue;
                }
            };
            match validate(value) {
                Ok(outcome) => return Ok(outcome),
                Err(message) => {
                    debug!(attempt, %message, "reviewer output failed validation");
                    last_error = message;
                }
            }
        }
        Err(BridgeError::parse(last_error))
    }

    /// Diff budget: chunk limit minus fixed scaffolding and variable
    /// context/criteria overhead, floored at [`MIN_DIFF_BUDGET`].
    fn diff_budget(&self, context: Option<&str>, criteria: &[String]) -> usize {
        let variable = estimate_tokens(context.unwrap_or(""))
            + estimate_tokens(&self.config.project_context)
            + estimate_tokens(&criteria.join(", "));
        self.config
            .max_chunk_tokens
            .saturating_sub(FIXED_PROMPT_OVERHEAD + variable)
            .max(MIN_DIFF_BUDGET)
    }

    // ── Plan ────────────────────────────────────────────────────────────

    /// Review an implementation plan in a single turn.
    pub async fn review_plan(&self, req: PlanRequest) -> Result<PlanReviewResult> {
        let focus = if req.focus.is_empty() {
            self.config.plan.focus.clone()
        } else {
            req.focus
        };
        let depth = req.depth.unwrap_or(self.config.plan.depth);
        let prompt = build_plan_prompt(
            &req.plan,
            &self.config.project_context,
            req.context.as_deref(),
            &focus,
            depth,
        );

        let mut thread = self.acquire(req.session_id.as_deref()).await?;
        let outcome = self
            .run_turn(&mut thread, &prompt, &plan_schema(), validate_plan)
            .await?;
        let session_id = resolve_session_id(thread.id(), req.session_id.as_deref())?;
        Ok(PlanReviewResult {
            verdict: outcome.verdict,
            summary: outcome.summary,
            findings: outcome.findings,
            session_id,
        })
    }

    // ── Code ────────────────────────────────────────────────────────────

    /// Review a diff, chunking when it exceeds the budget.
    pub async fn review_code(&self, req: CodeRequest) -> Result<CodeReviewResult> {
        let criteria = if req.criteria.is_empty() {
            self.config.code.criteria.clone()
        } else {
            req.criteria
        };
        let budget = self.diff_budget(req.context.as_deref(), &criteria);
        let chunks = chunk_diff(&req.diff, budget);

        match chunks.len() {
            0 => Ok(CodeReviewResult {
                verdict: CodeVerdict::Approve,
                summary: "No changes to review.".to_owned(),
                findings: Vec::new(),
                session_id: req.session_id.clone().unwrap_or_default(),
                chunks_reviewed: None,
            }),
            1 => {
                let prompt = build_code_prompt(
                    &chunks[0],
                    &self.config.project_context,
                    req.context.as_deref(),
                    &criteria,
                    self.config.code.require_tests,
                    None,
                );
                let mut thread = self.acquire(req.session_id.as_deref()).await?;
                let outcome = self
                    .run_turn(&mut thread, &prompt, &code_schema(), validate_code)
                    .await?;
                let session_id = resolve_session_id(thread.id(), req.session_id.as_deref())?;
                Ok(CodeReviewResult {
                    verdict: outcome.verdict,
                    summary: outcome.summary,
                    findings: outcome.findings,
                    session_id,
                    chunks_reviewed: None,
                })
            }
            total => {
                debug!(total, budget, "diff split into chunks");
                let mut outcomes = Vec::with_capacity(total);
                let mut session: Option<String> = req.session_id.clone();
                for (i, chunk) in chunks.iter().enumerate() {
                    let prompt = build_code_prompt(
                        chunk,
                        &self.config.project_context,
                        req.context.as_deref(),
                        &criteria,
                        self.config.code.require_tests,
                        Some(ChunkProgress {
                            index: i + 1,
                            total,
                        }),
                    );
                    let mut thread = self.acquire(session.as_deref()).await?;
                    let outcome = self
                        .run_turn(&mut thread, &prompt, &code_schema(), validate_code)
                        .await?;
                    session = Some(resolve_session_id(thread.id(), session.as_deref())?);
                    outcomes.push(outcome);
                }
                let session_id = session.expect("resolved after every chunk");
                Ok(merge_code(outcomes, session_id))
            }
        }
    }

    // ── Precommit ───────────────────────────────────────────────────────

    /// Review a staged diff against the commit gate.
    pub async fn review_precommit(&self, req: PrecommitRequest) -> Result<PrecommitResult> {
        let budget = self.diff_budget(None, &req.checklist);
        let chunks = chunk_diff(&req.diff, budget);
        let block_on = &self.config.precommit.block_on;

        match chunks.len() {
            0 => Ok(PrecommitResult {
                ready_to_commit: true,
                blockers: Vec::new(),
                warnings: Vec::new(),
                session_id: req.session_id.clone().unwrap_or_default(),
                chunks_reviewed: None,
            }),
            1 => {
                let prompt = build_precommit_prompt(
                    &chunks[0],
                    &self.config.project_context,
                    &req.checklist,
                    block_on,
                    None,
                );
                let mut thread = self.acquire(req.session_id.as_deref()).await?;
                let outcome = self
                    .run_turn(&mut thread, &prompt, &precommit_schema(), validate_precommit)
                    .await?;
                let session_id = resolve_session_id(thread.id(), req.session_id.as_deref())?;
                Ok(PrecommitResult {
                    ready_to_commit: outcome.ready_to_commit,
                    blockers: outcome.blockers,
                    warnings: outcome.warnings,
                    session_id,
                    chunks_reviewed: None,
                })
            }
            total => {
                let mut outcomes = Vec::with_capacity(total);
                let mut session: Option<String> = req.session_id.clone();
                for (i, chunk) in chunks.iter().enumerate() {
                    let prompt = build_precommit_prompt(
                        chunk,
                        &self.config.project_context,
                        &req.checklist,
                        block_on,
                        Some(ChunkProgress {
                            index: i + 1,
                            total,
                        }),
                    );
                    let mut thread = self.acquire(session.as_deref()).await?;
                    let outcome = self
                        .run_turn(&mut thread, &prompt, &precommit_schema(), validate_precommit)
                        .await?;
                    session = Some(resolve_session_id(thread.id(), session.as_deref())?);
                    outcomes.push(outcome);
                }
                let session_id = session.expect("resolved after every chunk");
                Ok(merge_precommit(outcomes, session_id))
            }
        }
    }
}

/// The session id attached to a result: the thread's reported id when
/// non-null, otherwise the caller-supplied id.
fn resolve_session_id(thread_id: Option<String>, caller: Option<&str>) -> Result<String> {
    thread_id
        .or_else(|| caller.map(ToOwned::to_owned))
        .ok_or_else(|| BridgeError::parse("missing session ID"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
