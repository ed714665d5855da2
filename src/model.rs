use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Reason string the validation service uses for template syntax problems.
pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Fatal,
    Warning,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Warning => "WARNING",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One problem reported by the validation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HublError {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub start_position: usize,
}

impl HublError {
    pub fn is_syntax_error(&self) -> bool {
        self.reason == SYNTAX_ERROR
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default)]
    pub errors: Vec<HublError>,
}

/// Validation outcome for a single template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintResult {
    pub file: PathBuf,
    pub validation: Validation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_from_service_json() {
        let json = r#"{
            "errors": [
                {
                    "reason": "SYNTAX_ERROR",
                    "severity": "FATAL",
                    "message": "Unclosed tag",
                    "lineno": 3,
                    "startPosition": 7,
                    "categoryErrors": {}
                },
                {
                    "reason": "UNKNOWN_TAG",
                    "severity": "NOTICE",
                    "message": "Unknown tag foo"
                }
            ],
            "renderingErrors": []
        }"#;
        let validation: Validation = serde_json::from_str(json).unwrap();
        assert_eq!(validation.errors.len(), 2);
        assert!(validation.errors[0].is_syntax_error());
        assert_eq!(validation.errors[0].start_position, 7);
        assert_eq!(validation.errors[1].severity, Severity::Unknown);
        assert_eq!(validation.errors[1].lineno, 0);
        assert!(!validation.errors[1].is_syntax_error());
    }

    #[test]
    fn test_validation_without_errors_field() {
        let validation: Validation = serde_json::from_str("{}").unwrap();
        assert!(validation.errors.is_empty());
    }
}
