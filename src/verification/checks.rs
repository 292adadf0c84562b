use serde::{Deserialize, Serialize};

use crate::domain::{Alert, AlertSeverity, Report};

/// Canonical notes for a report that raised nothing.
pub const ALL_CHECKS_PASSED: &str = "All checks passed. Photo verified.";

/// One step of the verification pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Report GPS against the baseline site coordinate
    GpsPlausibility,
    /// Photo reuse across submissions
    DuplicateImage,
    /// Reported against detected workers
    LaborCount,
    /// Cumulative consumption against the material plan
    MaterialConsumption,
}

impl Check {
    pub fn detector_name(&self) -> &'static str {
        match self {
            Self::GpsPlausibility => "baseline",
            Self::DuplicateImage => "duplicate-image",
            Self::LaborCount => "worker-count",
            Self::MaterialConsumption => "material-history",
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GpsPlausibility => write!(f, "GPS Plausibility"),
            Self::DuplicateImage => write!(f, "Duplicate Image"),
            Self::LaborCount => write!(f, "Labor Count"),
            Self::MaterialConsumption => write!(f, "Material Consumption"),
        }
    }
}

/// A finding produced by one pipeline step, not yet owned by any ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCandidate {
    pub check: Check,
    pub severity: AlertSeverity,
    pub message: String,
    /// Whether this finding on its own fails verification.
    pub clears_verified: bool,
}

impl AlertCandidate {
    pub fn flagging(check: Check, severity: AlertSeverity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            clears_verified: true,
        }
    }

    pub fn warning(check: Check, severity: AlertSeverity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            clears_verified: false,
        }
    }

    pub fn to_alert(&self, report: &Report) -> Alert {
        Alert::new(&report.project_id, self.severity, &self.message).with_report(&report.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No findings
    Verified,
    /// Findings were raised but none of them fails verification
    VerifiedWithWarnings,
    /// At least one finding fails verification
    Flagged,
}

impl Verdict {
    pub fn is_verified(&self) -> bool {
        !matches!(self, Self::Flagged)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verified => write!(f, "verified"),
            Self::VerifiedWithWarnings => write!(f, "verified with warnings"),
            Self::Flagged => write!(f, "flagged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verdict: Verdict,
    pub verified: bool,
    pub notes: String,
    /// Findings in pipeline order.
    pub alerts: Vec<AlertCandidate>,
    /// Steps that could not run because a detector or store failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Check>,
}

impl VerificationResult {
    pub fn new(alerts: Vec<AlertCandidate>, fragments: Vec<String>, degraded: Vec<Check>) -> Self {
        let verdict = if alerts.iter().any(|a| a.clears_verified) {
            Verdict::Flagged
        } else if alerts.is_empty() {
            Verdict::Verified
        } else {
            Verdict::VerifiedWithWarnings
        };

        let notes = if !alerts.is_empty() {
            fragments.join(" ")
        } else if degraded.is_empty() {
            ALL_CHECKS_PASSED.to_string()
        } else {
            format!("All available checks passed. {}", fragments.join(" "))
        };

        Self {
            verdict,
            verified: verdict.is_verified(),
            notes,
            alerts,
            degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    pub fn highest_severity(&self) -> Option<AlertSeverity> {
        self.alerts.iter().map(|a| a.severity).max()
    }

    /// Materialize the candidates as ledger alerts for `report`.
    pub fn to_alerts(&self, report: &Report) -> Vec<Alert> {
        self.alerts.iter().map(|c| c.to_alert(report)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_findings_passes() {
        let result = VerificationResult::new(vec![], vec![], vec![]);
        assert_eq!(result.verdict, Verdict::Verified);
        assert!(result.verified);
        assert_eq!(result.notes, ALL_CHECKS_PASSED);
        assert!(result.highest_severity().is_none());
    }

    #[test]
    fn test_warning_only_stays_verified() {
        let result = VerificationResult::new(
            vec![AlertCandidate::warning(
                Check::LaborCount,
                AlertSeverity::Medium,
                "More workers detected",
            )],
            vec!["Unreported workers.".into()],
            vec![],
        );
        assert_eq!(result.verdict, Verdict::VerifiedWithWarnings);
        assert!(result.verified);
        assert_eq!(result.notes, "Unreported workers.");
    }

    #[test]
    fn test_flagging_finding_fails() {
        let result = VerificationResult::new(
            vec![
                AlertCandidate::flagging(Check::DuplicateImage, AlertSeverity::High, "dup"),
                AlertCandidate::warning(Check::MaterialConsumption, AlertSeverity::Medium, "m"),
            ],
            vec!["Duplicate image.".into(), "Material overuse: Cement.".into()],
            vec![],
        );
        assert_eq!(result.verdict, Verdict::Flagged);
        assert!(!result.verified);
        assert_eq!(result.notes, "Duplicate image. Material overuse: Cement.");
        assert_eq!(result.highest_severity(), Some(AlertSeverity::High));
    }

    #[test]
    fn test_degraded_without_findings() {
        let result = VerificationResult::new(
            vec![],
            vec!["Detector worker-count unavailable: timed out after 10ms.".into()],
            vec![Check::LaborCount],
        );
        assert!(result.verified);
        assert!(result.is_degraded());
        assert!(result.notes.starts_with("All available checks passed."));
        assert!(result.notes.contains("worker-count"));
    }
}
