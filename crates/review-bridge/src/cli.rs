//! Terminal CLI: three subcommands over the same handlers the tool-call
//! server uses.
//!
//! Exit codes: 0 on success, 1 on input or runtime error, and 2 when a
//! precommit review blocks the commit — `review-precommit && git commit`
//! works as a shell guard.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use bridge_core::types::{CodeReviewResult, PlanReviewResult, PrecommitResult};
use bridge_core::BridgeError;
use bridge_engine::{ResolveArgs, ResolveError};
use bridge_rpc::registry::ToolHandler;
use bridge_rpc::{handlers, RpcContext};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

use crate::format;
use crate::input::read_input;

/// Review orchestration bridge.
#[derive(Parser, Debug)]
#[command(name = "review-bridge", version, about = "Structured plan, code, and precommit reviews")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review an implementation plan.
    ReviewPlan(PlanArgs),
    /// Review a unified diff.
    ReviewCode(CodeArgs),
    /// Review the staged diff as a commit gate.
    ReviewPrecommit(PrecommitArgs),
}

/// Review depth, validated at parse time.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DepthArg {
    Quick,
    Thorough,
}

impl DepthArg {
    fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Thorough => "thorough",
        }
    }
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan file, or '-' for stdin.
    #[arg(long)]
    pub plan: String,
    /// Comma-separated focus areas.
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,
    /// Review depth.
    #[arg(long, value_enum)]
    pub depth: Option<DepthArg>,
    /// Session to resume.
    #[arg(long)]
    pub session: Option<String>,
    /// Directory containing .reviewbridge.json.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the raw result JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Diff file, or '-' for stdin.
    #[arg(long)]
    pub diff: String,
    /// Comma-separated review criteria.
    #[arg(long, value_delimiter = ',')]
    pub focus: Vec<String>,
    /// Session to resume.
    #[arg(long)]
    pub session: Option<String>,
    /// Directory containing .reviewbridge.json.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the raw result JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PrecommitArgs {
    /// Diff file, or '-' for stdin; omitted → staged diff via git.
    #[arg(long)]
    pub diff: Option<String>,
    /// Session to resume.
    #[arg(long)]
    pub session: Option<String>,
    /// Directory containing .reviewbridge.json.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print the raw result JSON.
    #[arg(long)]
    pub json: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Execution
// ─────────────────────────────────────────────────────────────────────────────

/// Run a parsed CLI invocation to completion.
pub async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::ReviewPlan(args) => run_plan(args).await,
        Command::ReviewCode(args) => run_code(args).await,
        Command::ReviewPrecommit(args) => run_precommit(args).await,
    }
}

fn fail(err: &BridgeError) -> ExitCode {
    eprintln!("{err}");
    ExitCode::FAILURE
}

fn setup(config_dir: Option<&Path>) -> Result<Arc<RpcContext>, BridgeError> {
    let config = match config_dir {
        Some(dir) => bridge_settings::load_config_from_dir(dir),
        None => bridge_settings::load_config(),
    }?;
    crate::build_context(config)
        .map(Arc::new)
        .map_err(|e| BridgeError::unknown(e.to_string()))
}

fn emit<T: serde::Serialize>(result: &T, as_json: bool, render: impl Fn(&T) -> String) {
    if as_json {
        match serde_json::to_string_pretty(result) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("failed to serialize result: {err}"),
        }
    } else {
        print!("{}", render(result));
    }
}

fn parse_result<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, BridgeError> {
    serde_json::from_value(value).map_err(|e| BridgeError::unknown(e.to_string()))
}

async fn run_plan(args: PlanArgs) -> ExitCode {
    let ctx = match setup(args.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(err) => return fail(&err),
    };
    let plan = match read_input(&args.plan).await {
        Ok(plan) => plan,
        Err(err) => return fail(&err),
    };

    let mut call_args = json!({ "plan": plan, "focus": args.focus });
    if let Some(depth) = args.depth {
        call_args["depth"] = json!(depth.as_str());
    }
    if let Some(session) = &args.session {
        call_args["session_id"] = json!(session);
    }

    match handlers::plan::ReviewPlanHandler.call(call_args, &ctx).await {
        Ok(value) => {
            let result: PlanReviewResult = match parse_result(value) {
                Ok(result) => result,
                Err(err) => return fail(&err),
            };
            let color = format::color_from_env();
            emit(&result, args.json, |r| format::render_plan(r, color));
            ExitCode::SUCCESS
        }
        Err(err) => fail(&err),
    }
}

async fn run_code(args: CodeArgs) -> ExitCode {
    let ctx = match setup(args.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(err) => return fail(&err),
    };
    let diff = match read_input(&args.diff).await {
        Ok(diff) => diff,
        Err(err) => return fail(&err),
    };

    let mut call_args = json!({ "diff": diff, "criteria": args.focus });
    if let Some(session) = &args.session {
        call_args["session_id"] = json!(session);
    }

    match handlers::code::ReviewCodeHandler.call(call_args, &ctx).await {
        Ok(value) => {
            let result: CodeReviewResult = match parse_result(value) {
                Ok(result) => result,
                Err(err) => return fail(&err),
            };
            let color = format::color_from_env();
            emit(&result, args.json, |r| format::render_code(r, color));
            ExitCode::SUCCESS
        }
        Err(err) => fail(&err),
    }
}

/// Exit status for a settled precommit review.
pub(crate) fn precommit_exit_code(ready_to_commit: bool) -> u8 {
    if ready_to_commit {
        0
    } else {
        2
    }
}

async fn run_precommit(args: PrecommitArgs) -> ExitCode {
    let ctx = match setup(args.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(err) => return fail(&err),
    };

    let explicit = match &args.diff {
        Some(source) => match read_input(source).await {
            Ok(diff) => Some(diff),
            Err(err) => return fail(&err),
        },
        None => None,
    };

    // Resolve here so an empty staged diff is a CLI error, not the tool
    // surface's structured non-error response.
    let resolved = ctx
        .resolver
        .resolve(&ResolveArgs {
            diff: explicit,
            auto_diff: true,
        })
        .await;
    let diff = match resolved {
        Ok(diff) => diff,
        Err(err @ ResolveError::NoStagedChanges(_)) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
        Err(err) => return fail(&err.into()),
    };

    let mut call_args = json!({ "diff": diff });
    if let Some(session) = &args.session {
        call_args["session_id"] = json!(session);
    }

    match handlers::precommit::ReviewPrecommitHandler
        .call(call_args, &ctx)
        .await
    {
        Ok(value) => {
            let result: PrecommitResult = match parse_result(value) {
                Ok(result) => result,
                Err(err) => return fail(&err),
            };
            let color = format::color_from_env();
            emit(&result, args.json, |r| format::render_precommit(r, color));
            ExitCode::from(precommit_exit_code(result.ready_to_commit))
        }
        Err(err) => fail(&err),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
