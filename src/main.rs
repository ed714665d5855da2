mod api;
mod cli;
mod cmd;
mod completions;
mod config;
mod debug_info;
mod error;
mod filesystem;
mod git;
mod hubl;
mod logger;
mod model;
mod usage;
mod validation;

use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::prelude::*;

use cli::{Cli, Command};
use cmd::{cmd_lint, LintOptions, Services};
use completions::cmd_completions;
use error::CommandError;
use hubl::HublLinter;
use logger::{LogLevel, Logger};
use usage::HttpUsageTracker;
use validation::RemotePortalValidator;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        if !e.is_reported() {
            eprintln!("error: {:#}", e);
        }
        process::exit(e.exit_code());
    }
}

/// Internal diagnostics, enabled with e.g. `CMS_TRACING=cms=debug`.
fn init_tracing() {
    let Ok(filter) = tracing_subscriber::EnvFilter::try_from_env("CMS_TRACING") else {
        return;
    };
    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(filter)
        .with(format_layer)
        .init();
}

fn run() -> Result<(), CommandError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Lint { path, portal } => {
            let cwd = std::env::current_dir().context("cannot determine current directory")?;
            let options = LintOptions {
                path,
                portal,
                config: cli.config,
                debug: cli.debug,
                log_level: cli.log_level,
            };
            let logger = Logger::new(LogLevel::Log);
            let services = Services {
                validator: &RemotePortalValidator,
                linter: &HublLinter,
                tracker: &HttpUsageTracker,
            };
            let summary = cmd_lint(&options, &cwd, &services, &logger)?;
            tracing::debug!(issues = summary.issues, "lint finished");
            Ok(())
        }
        Command::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
