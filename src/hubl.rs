use std::iter;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ignore::WalkBuilder;

use crate::api::validate::validate_hubl;
use crate::api::{auth, ApiClient, Auth};
use crate::config::{Config, PortalConfig};
use crate::logger::Logger;
use crate::model::{LintResult, Severity};

/// File extensions that may contain HubL.
pub const HUBL_EXTENSIONS: &[&str] = &["html", "css", "js"];

/// Ordered stream of per-file results. The first `Err` ends a run.
pub type LintResults<'a> = Box<dyn Iterator<Item = Result<LintResult>> + 'a>;

pub trait Linter {
    fn lint<'a>(
        &'a self,
        config: &'a Config,
        portal: &'a PortalConfig,
        path: &'a Path,
    ) -> LintResults<'a>;
}

/// Sends every template under a path to the remote HubL validator.
pub struct HublLinter;

impl Linter for HublLinter {
    fn lint<'a>(
        &'a self,
        config: &'a Config,
        portal: &'a PortalConfig,
        path: &'a Path,
    ) -> LintResults<'a> {
        let session = ApiClient::new(config, portal.env).and_then(|client| {
            let auth = auth::authenticate(&client, portal)?;
            Ok((client, auth))
        });
        let (client, auth) = match session {
            Ok(session) => session,
            Err(err) => return Box::new(iter::once(Err(err))),
        };

        let portal_id = portal.id();
        Box::new(
            template_files(path)
                .map(move |file| file.and_then(|file| lint_file(&client, &auth, portal_id, file))),
        )
    }
}

fn lint_file(client: &ApiClient, auth: &Auth, portal_id: u64, file: PathBuf) -> Result<LintResult> {
    let bytes =
        std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    // Legacy encodings still get linted; invalid bytes become U+FFFD.
    let source = String::from_utf8_lossy(&bytes);
    let validation = validate_hubl(client, auth, portal_id, &source)
        .with_context(|| format!("Failed to validate {}", file.display()))?;
    tracing::debug!(file = %file.display(), errors = validation.errors.len(), "validated template");
    Ok(LintResult { file, validation })
}

pub fn is_hubl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| HUBL_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Lazily walk `path` (a file or a directory) yielding HubL candidates in
/// file-name order.
pub fn template_files(path: &Path) -> Box<dyn Iterator<Item = Result<PathBuf>>> {
    if !path.exists() {
        return Box::new(iter::once(Err(anyhow!(
            "The path \"{}\" does not exist",
            path.display()
        ))));
    }

    let walker = WalkBuilder::new(path)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    Box::new(walker.filter_map(|entry| match entry {
        Ok(entry) => {
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if is_file && is_hubl_file(entry.path()) {
                Some(Ok(entry.into_path()))
            } else {
                None
            }
        }
        Err(err) => Some(Err(err.into())),
    }))
}

/// Print the syntax errors of one result and return how many were printed.
///
/// Errors with another reason are not counted.
pub fn print_validation_result(result: &LintResult, logger: &Logger) -> usize {
    let syntax_errors: Vec<_> = result
        .validation
        .errors
        .iter()
        .filter(|err| err.is_syntax_error())
        .collect();
    if syntax_errors.is_empty() {
        return 0;
    }

    let _group = logger.group(result.file.display().to_string());
    for err in &syntax_errors {
        let message = if err.start_position > 0 {
            format!("[{}, {}]: {}", err.lineno, err.start_position, err.message)
        } else {
            format!("[{}]: {}", err.lineno, err.message)
        };
        tracing::trace!(severity = %err.severity, "{message}");
        if err.severity == Severity::Fatal {
            logger.error(message);
        } else {
            logger.warn(message);
        }
    }
    syntax_errors.len()
}
