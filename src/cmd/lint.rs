use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::config::{self, Config};
use crate::debug_info::log_debug_info;
use crate::error::CommandError;
use crate::filesystem::resolve_local_path;
use crate::git::check_and_warn_git_inclusion;
use crate::hubl::{print_validation_result, Linter};
use crate::logger::{LogLevel, Logger};
use crate::model::LintResult;
use crate::usage::{UsageMeta, UsageTracker};
use crate::validation::PortalValidator;

pub const COMMAND_NAME: &str = "lint";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintOptions {
    pub path: PathBuf,
    pub portal: Option<String>,
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub log_level: Option<LogLevel>,
}

/// Collaborators the lint command talks to.
pub struct Services<'a> {
    pub validator: &'a dyn PortalValidator,
    pub linter: &'a dyn Linter,
    pub tracker: &'a dyn UsageTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintSummary {
    pub issues: usize,
}

pub fn cmd_lint(
    options: &LintOptions,
    cwd: &Path,
    services: &Services<'_>,
    logger: &Logger,
) -> Result<LintSummary, CommandError> {
    let config = prepare(options, cwd, services, logger)?;

    let portal = config
        .selected_portal(options.portal.as_deref())
        .ok_or(CommandError::Precondition)?;
    let portal_id = portal.id();
    let local_path = resolve_local_path(&options.path, cwd);

    let meta = UsageMeta {
        auth_type: Some(portal.auth_type),
    };
    if let Err(err) = services
        .tracker
        .track(&config, COMMAND_NAME, &meta, Some(portal_id))
    {
        tracing::debug!(error = %err, "usage tracking failed");
        logger.debug(format!("Usage tracking failed: {err:#}"));
    }

    let outcome = {
        let _group = logger.group(format!("Linting \"{}\"", local_path.display()));
        count_issues(services.linter.lint(&config, portal, &local_path), logger)
    };

    match outcome {
        Ok(issues) => {
            logger.log(format!("{issues} issues found"));
            Ok(LintSummary { issues })
        }
        Err(error) => {
            tracing::error!(portal_id, error = ?error, "lint failed");
            logger.error(format!(
                "Linting failed for portal {portal_id}: {error:#}"
            ));
            Err(CommandError::Lint { portal_id, error })
        }
    }
}

/// Set verbosity, load the config and check that the portal is usable.
fn prepare(
    options: &LintOptions,
    cwd: &Path,
    services: &Services<'_>,
    logger: &Logger,
) -> Result<Config, CommandError> {
    logger.set_level(LogLevel::from_flags(options.debug, options.log_level));
    log_debug_info(logger, cwd, options);

    let Some(config_path) = config::locate(options.config.as_deref(), cwd) else {
        logger.error(format!(
            "No {} found in {} or any parent directory, and none in the home directory",
            config::CONFIG_FILE_NAME,
            cwd.display()
        ));
        return Err(CommandError::Precondition);
    };
    let config = Config::load(&config_path).map_err(|err| {
        logger.error(format!("{err:#}"));
        CommandError::Precondition
    })?;
    logger.debug(format!("Loaded config from {}", config_path.display()));

    check_and_warn_git_inclusion(&config_path, logger);

    if !(config.validate(logger)
        && services
            .validator
            .validate(&config, options.portal.as_deref(), logger))
    {
        return Err(CommandError::Precondition);
    }

    Ok(config)
}

/// Print every result in order and sum the printed issue counts, stopping
/// at the first failure.
fn count_issues<I>(results: I, logger: &Logger) -> Result<usize>
where
    I: IntoIterator<Item = Result<LintResult>>,
{
    results.into_iter().try_fold(0, |count, result| {
        Ok(count + print_validation_result(&result?, logger))
    })
}
