use std::time::Duration;

use thiserror::Error;

/// Failure reported by a detector port.
///
/// Never escapes the verification engine: a failing detector only degrades
/// coverage of its own pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorError {
    Unavailable(String),
    Timeout(Duration),
}

impl DetectorError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl std::fmt::Display for DetectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "unavailable: {}", reason),
            Self::Timeout(after) => write!(f, "timed out after {}ms", after.as_millis()),
        }
    }
}

impl std::error::Error for DetectorError {}

#[derive(Error, Debug)]
pub enum SentryError {
    #[error("Invalid report: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Detector {detector} unavailable: {source}")]
    DetectorUnavailable {
        detector: &'static str,
        source: DetectorError,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("No baseline defined for project: {0}")]
    BaselineNotFound(String),

    #[error("Verification cancelled")]
    VerificationCancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_bw::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SentryError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, SentryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = SentryError::validation("worker_count", "must be >= 0");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid report: worker_count must be >= 0");
    }

    #[test]
    fn test_detector_error_display() {
        let err = DetectorError::Timeout(Duration::from_millis(1500));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "timed out after 1500ms");
        assert_eq!(
            DetectorError::unavailable("model offline").to_string(),
            "unavailable: model offline"
        );
    }

    #[test]
    fn test_detector_unavailable_display() {
        let err = SentryError::DetectorUnavailable {
            detector: "worker-count",
            source: DetectorError::unavailable("model offline"),
        };
        assert_eq!(
            err.to_string(),
            "Detector worker-count unavailable: unavailable: model offline"
        );
    }
}
