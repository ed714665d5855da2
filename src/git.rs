use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use crate::logger::Logger;

pub fn git_command(args: &[&str], cwd: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    let stdout =
        String::from_utf8(output.stdout).with_context(|| "git output is not valid UTF-8")?;

    Ok(stdout)
}

pub fn is_inside_work_tree(dir: &Path) -> bool {
    git_command(&["rev-parse", "--is-inside-work-tree"], dir)
        .map(|out| out.trim() == "true")
        .unwrap_or(false)
}

/// Whether git's ignore rules exclude `path`.
///
/// `git check-ignore` exits 0 for ignored paths and 1 for tracked-eligible
/// ones; anything else is an error.
pub fn is_ignored(path: &Path) -> Result<bool> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let output = Command::new("git")
        .args(["check-ignore", "-q"])
        .arg(path)
        .current_dir(dir)
        .output()
        .context("Failed to execute git check-ignore")?;

    match output.status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git check-ignore failed: {}", stderr.trim())
        }
    }
}

/// Warn when the config file, which holds credentials, could be committed.
pub fn check_and_warn_git_inclusion(config_path: &Path, logger: &Logger) {
    let Some(dir) = config_path.parent() else {
        return;
    };
    if !dir.is_dir() || !is_inside_work_tree(dir) {
        return;
    }
    match is_ignored(config_path) {
        Ok(true) => {}
        Ok(false) => {
            logger.warn(format!(
                "Security issue: the config file {} is not ignored by git.",
                config_path.display()
            ));
            logger.warn("Add it to your .gitignore to avoid committing credentials.");
        }
        Err(err) => tracing::debug!(error = %err, "git ignore check failed"),
    }
}
