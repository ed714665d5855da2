use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::logger::{LogLevel, Logger};

/// Log a snapshot of the running binary and its options at debug level.
pub fn log_debug_info(logger: &Logger, cwd: &Path, options: &impl Serialize) {
    if !logger.enabled(LogLevel::Debug) {
        return;
    }
    let info = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "cwd": cwd.display().to_string(),
        "logLevel": logger.level(),
        "options": options,
    });
    match serde_json::to_string_pretty(&info) {
        Ok(info) => logger.debug(format!("Debug info: {info}")),
        Err(err) => tracing::debug!(error = %err, "failed to serialize debug info"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::helpers::captured_logger;

    #[derive(Serialize)]
    struct Options {
        portal: &'static str,
    }

    #[test]
    fn test_logged_only_at_debug_level() {
        let (logger, capture) = captured_logger(LogLevel::Log);
        log_debug_info(&logger, Path::new("/work"), &Options { portal: "prod" });
        assert_eq!(capture.stdout(), "");

        logger.set_level(LogLevel::Debug);
        log_debug_info(&logger, Path::new("/work/site"), &Options { portal: "prod" });
        let out = capture.stdout();
        assert!(out.starts_with("[DEBUG] Debug info: {"));
        assert!(out.contains(&format!("\"version\": \"{}\"", env!("CARGO_PKG_VERSION"))));
        assert!(out.contains("\"portal\": \"prod\""));
        assert!(out.contains("\"cwd\": \"/work/site\""));
    }
}
