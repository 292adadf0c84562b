//! Per-run accumulator for the four verification steps.
//!
//! Each step appends at most one finding (material checks: one per
//! over-consumed material) plus a short diagnostic fragment. Nothing here
//! performs I/O; the engine feeds in detector answers.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use super::checks::{AlertCandidate, Check, VerificationResult};
use crate::config::VerificationConfig;
use crate::detection::DetectorResult;
use crate::domain::{AlertSeverity, MaterialEntry, ProjectBaseline};
use crate::error::{DetectorError, SentryError};
use crate::geo::{Coordinate, distance_meters};

pub(crate) struct PipelineRun<'a> {
    config: &'a VerificationConfig,
    alerts: Vec<AlertCandidate>,
    fragments: Vec<String>,
    degraded: Vec<Check>,
}

impl<'a> PipelineRun<'a> {
    pub(crate) fn new(config: &'a VerificationConfig) -> Self {
        Self {
            config,
            alerts: Vec::new(),
            fragments: Vec::new(),
            degraded: Vec::new(),
        }
    }

    fn raise(&mut self, candidate: AlertCandidate, fragment: String) {
        debug!(check = %candidate.check, severity = %candidate.severity, "Finding raised");
        self.alerts.push(candidate);
        self.fragments.push(fragment);
    }

    /// Record that `check` could not run.
    pub(crate) fn degrade(&mut self, check: Check, source: DetectorError) {
        let err = SentryError::DetectorUnavailable {
            detector: check.detector_name(),
            source,
        };
        warn!(check = %check, error = %err, "Verification coverage degraded");
        self.fragments.push(format!("{}.", err));
        if !self.degraded.contains(&check) {
            self.degraded.push(check);
        }
    }

    pub(crate) fn baseline_unavailable(&mut self, reason: String) {
        self.degrade(Check::GpsPlausibility, DetectorError::Unavailable(reason));
        if !self.degraded.contains(&Check::MaterialConsumption) {
            self.degraded.push(Check::MaterialConsumption);
        }
    }

    pub(crate) fn check_gps(&mut self, reported: Coordinate, site: Coordinate) {
        let distance = distance_meters(reported, site);
        debug!(distance_m = distance, "GPS distance to site");
        if distance > self.config.gps_tolerance_meters {
            self.raise(
                AlertCandidate::flagging(
                    Check::GpsPlausibility,
                    AlertSeverity::High,
                    format!(
                        "GPS location mismatch: photo GPS {} is {:.0}m from project site",
                        reported, distance
                    ),
                ),
                format!("GPS mismatch ({:.0}m from site).", distance),
            );
        }
    }

    pub(crate) fn check_duplicate(&mut self, answer: DetectorResult<bool>) {
        match answer {
            Ok(true) => self.raise(
                AlertCandidate::flagging(
                    Check::DuplicateImage,
                    AlertSeverity::High,
                    "Duplicate photo detected: same image uploaded previously",
                ),
                "Duplicate image.".to_string(),
            ),
            Ok(false) => {}
            Err(e) => self.degrade(Check::DuplicateImage, e),
        }
    }

    pub(crate) fn check_labor(&mut self, reported: u32, answer: DetectorResult<u32>) {
        let detected = match answer {
            Ok(detected) => detected,
            Err(e) => return self.degrade(Check::LaborCount, e),
        };
        debug!(reported, detected, "Worker count compared");

        let tolerance = i64::from(self.config.worker_tolerance);
        let (reported_i, detected_i) = (i64::from(reported), i64::from(detected));

        if detected_i < reported_i - tolerance {
            self.raise(
                AlertCandidate::flagging(
                    Check::LaborCount,
                    AlertSeverity::High,
                    format!(
                        "Worker count mismatch: reported {}, detected {}. Suspected proxy labor",
                        reported, detected
                    ),
                ),
                format!(
                    "Worker count mismatch (reported {}, detected {}).",
                    reported, detected
                ),
            );
        } else if detected_i > reported_i + tolerance {
            // Over-presence is only a warning; under-reporting is the fraud direction.
            self.raise(
                AlertCandidate::warning(
                    Check::LaborCount,
                    AlertSeverity::Medium,
                    format!(
                        "More workers detected ({}) than reported ({}). Possible unregistered labor",
                        detected, reported
                    ),
                ),
                format!(
                    "Unreported workers (detected {}, reported {}).",
                    detected, reported
                ),
            );
        }
    }

    pub(crate) fn check_materials(
        &mut self,
        baseline: &ProjectBaseline,
        logged: &[MaterialEntry],
        cumulative: &BTreeMap<String, f64>,
    ) {
        let mut seen = HashSet::new();
        for entry in logged {
            let key = entry.key();
            if !seen.insert(key.clone()) {
                continue;
            }
            let Some(planned) = baseline.planned_quantity(&entry.name) else {
                continue;
            };
            if planned <= 0.0 {
                continue;
            }
            let used = cumulative.get(&key).copied().unwrap_or(entry.quantity);
            let limit = planned * self.config.material_overage_ratio;
            debug!(material = %key, used, planned, limit, "Material consumption compared");

            if used > limit {
                self.raise(
                    AlertCandidate::warning(
                        Check::MaterialConsumption,
                        AlertSeverity::Medium,
                        format!(
                            "Material usage exceeds plan for {}: {} used against {} planned. Possible theft or inaccurate reporting",
                            entry.name,
                            format_quantity(used),
                            format_quantity(planned)
                        ),
                    ),
                    format!("Material overuse: {}.", entry.name),
                );
            }
        }
    }

    pub(crate) fn finish(self) -> VerificationResult {
        VerificationResult::new(self.alerts, self.fragments, self.degraded)
    }
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::verification::Verdict;

    fn config() -> VerificationConfig {
        VerificationConfig::default()
    }

    #[test]
    fn test_labor_boundaries_are_inclusive() {
        let cfg = config();
        for detected in [9, 10, 12, 15] {
            let mut run = PipelineRun::new(&cfg);
            run.check_labor(12, Ok(detected));
            let result = run.finish();
            assert!(result.alerts.is_empty(), "detected {} raised", detected);
        }

        let mut run = PipelineRun::new(&cfg);
        run.check_labor(12, Ok(8));
        assert_eq!(run.finish().verdict, Verdict::Flagged);

        let mut run = PipelineRun::new(&cfg);
        run.check_labor(12, Ok(16));
        assert_eq!(run.finish().verdict, Verdict::VerifiedWithWarnings);
    }

    #[test]
    fn test_labor_small_reported_counts_do_not_underflow() {
        let cfg = config();
        let mut run = PipelineRun::new(&cfg);
        run.check_labor(0, Ok(0));
        run.check_labor(2, Ok(0));
        assert!(run.finish().alerts.is_empty());
    }

    #[test]
    fn test_materials_deduplicate_repeated_entries() {
        let cfg = config();
        let baseline = ProjectBaseline::new("proj-1").with_material("cement", 500.0);
        let logged = vec![
            MaterialEntry::new("Cement", 300.0, "bags"),
            MaterialEntry::new("cement", 300.0, "bags"),
        ];
        let cumulative = BTreeMap::from([("cement".to_string(), 600.0)]);

        let mut run = PipelineRun::new(&cfg);
        run.check_materials(&baseline, &logged, &cumulative);
        let result = run.finish();
        assert_eq!(result.alerts.len(), 1);
        assert!(result.alerts[0].message.contains("600 used against 500 planned"));
    }

    #[test]
    fn test_materials_without_plan_are_ignored() {
        let cfg = config();
        let baseline = ProjectBaseline::new("proj-1")
            .with_material("cement", 500.0)
            .with_material("glass", 0.0);
        let logged = vec![
            MaterialEntry::new("Timber", 9999.0, "m3"),
            MaterialEntry::new("Glass", 10.0, "panes"),
        ];
        let cumulative = BTreeMap::from([
            ("timber".to_string(), 9999.0),
            ("glass".to_string(), 10.0),
        ]);

        let mut run = PipelineRun::new(&cfg);
        run.check_materials(&baseline, &logged, &cumulative);
        assert!(run.finish().alerts.is_empty());
    }

    #[test]
    fn test_degrade_records_check_once() {
        let cfg = config();
        let mut run = PipelineRun::new(&cfg);
        run.degrade(
            Check::DuplicateImage,
            DetectorError::Timeout(Duration::from_millis(50)),
        );
        run.baseline_unavailable("disk offline".into());
        let result = run.finish();
        assert_eq!(
            result.degraded,
            vec![
                Check::DuplicateImage,
                Check::GpsPlausibility,
                Check::MaterialConsumption
            ]
        );
        assert!(result.notes.contains("duplicate-image"));
        assert!(result.notes.contains("disk offline"));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(560.0), "560");
        assert_eq!(format_quantity(4.5), "4.50");
    }
}
