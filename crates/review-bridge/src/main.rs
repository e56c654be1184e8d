//! Entry point: routes between CLI mode and the stdio tool-call server.

#![deny(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;

use review_bridge::cli::Cli;
use review_bridge::{build_context, init_tracing, is_cli_invocation, server};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if is_cli_invocation(&args) {
        let cli = Cli::parse();
        return review_bridge::cli::run(cli).await;
    }

    // No positional argv: speak the tool-call protocol on stdio.
    let config = match bridge_settings::load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", bridge_core::BridgeError::from(err));
            return ExitCode::FAILURE;
        }
    };
    let ctx = match build_context(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("failed to start: {err}");
            return ExitCode::FAILURE;
        }
    };
    match server::run(ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("server error: {err}");
            ExitCode::FAILURE
        }
    }
}
