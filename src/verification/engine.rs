//! Report verification with GPS, duplicate, labor and material checks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use super::checks::VerificationResult;
use super::pipeline::PipelineRun;
use crate::config::VerificationConfig;
use crate::detection::{
    DetectorResult, ImageDuplicateDetector, MaterialHistory, MaterialUsageEstimator,
    NoMaterialHistory, WorkerCountEstimator,
};
use crate::domain::{ProjectBaseline, Report};
use crate::error::{DetectorError, Result, SentryError};
use crate::store::BaselineProvider;

/// Stateless verifier. Safe to share across tasks and to run concurrently
/// for any number of reports.
#[derive(Clone)]
pub struct VerificationEngine {
    config: VerificationConfig,
    baselines: Arc<dyn BaselineProvider>,
    duplicates: Arc<dyn ImageDuplicateDetector>,
    workers: Arc<dyn WorkerCountEstimator>,
    history: Arc<dyn MaterialHistory>,
    usage: MaterialUsageEstimator,
    timeout: Duration,
}

impl VerificationEngine {
    pub fn new(
        config: VerificationConfig,
        baselines: Arc<dyn BaselineProvider>,
        duplicates: Arc<dyn ImageDuplicateDetector>,
        workers: Arc<dyn WorkerCountEstimator>,
    ) -> Self {
        Self {
            timeout: config.detector_timeout(),
            config,
            baselines,
            duplicates,
            workers,
            history: Arc::new(NoMaterialHistory),
            usage: MaterialUsageEstimator,
        }
    }

    pub fn with_material_history(mut self, history: Arc<dyn MaterialHistory>) -> Self {
        self.history = history;
        self
    }

    /// Bound each detector and baseline call; overrides the configured value.
    pub fn with_detector_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Run the full pipeline over one report.
    ///
    /// Fails only on malformed input. Detector and baseline failures degrade
    /// the affected step and are reported in the notes.
    pub async fn verify(&self, report: &Report) -> Result<VerificationResult> {
        report.validate()?;
        let timeout = self.timeout;
        debug!(report_id = %report.id, project_id = %report.project_id, "Verifying report");

        let (baseline, duplicate, detected, history) = tokio::join!(
            self.load_baseline(&report.project_id, timeout),
            bounded(
                timeout,
                self.duplicates
                    .is_duplicate(&report.photo, &report.project_id)
            ),
            bounded(timeout, self.workers.estimate(&report.photo)),
            async {
                if report.materials.is_empty() {
                    None
                } else {
                    Some(bounded(timeout, self.history.material_history(&report.project_id)).await)
                }
            },
        );

        let mut run = PipelineRun::new(&self.config);

        let baseline = match baseline {
            Ok(baseline) => baseline,
            Err(reason) => {
                run.baseline_unavailable(reason);
                None
            }
        };

        match baseline.as_ref().and_then(|b| b.site) {
            Some(site) => run.check_gps(report.location, site),
            None => debug!(project_id = %report.project_id, "No baseline site, GPS check skipped"),
        }

        run.check_duplicate(duplicate);
        run.check_labor(report.worker_count, detected);

        if let Some(baseline) = baseline.as_ref().filter(|b| b.has_materials())
            && let Some(history) = history
        {
            match history {
                Ok(history) => {
                    let cumulative = self.usage.cumulative(&history, &report.materials);
                    run.check_materials(baseline, &report.materials, &cumulative);
                }
                Err(e) => run.degrade(super::Check::MaterialConsumption, e),
            }
        }

        let result = run.finish();
        info!(
            report_id = %report.id,
            project_id = %report.project_id,
            verdict = %result.verdict,
            alerts = result.alerts.len(),
            degraded = result.degraded.len(),
            "Report verified"
        );
        Ok(result)
    }

    /// Like [`verify`](Self::verify), abandoning in-flight detector calls once
    /// `cancel` turns true. Partial findings are discarded.
    pub async fn verify_until(
        &self,
        report: &Report,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<VerificationResult> {
        if *cancel.borrow() {
            return Err(SentryError::VerificationCancelled);
        }

        tokio::select! {
            result = self.verify(report) => result,
            _ = cancelled(&mut cancel) => {
                debug!(report_id = %report.id, "Verification cancelled");
                Err(SentryError::VerificationCancelled)
            }
        }
    }

    async fn load_baseline(
        &self,
        project_id: &str,
        timeout: Duration,
    ) -> std::result::Result<Option<ProjectBaseline>, String> {
        match tokio::time::timeout(timeout, self.baselines.get_baseline(project_id)).await {
            Ok(Ok(baseline)) => Ok(baseline),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "baseline lookup timed out after {}ms",
                timeout.as_millis()
            )),
        }
    }
}

async fn bounded<T, F>(limit: Duration, call: F) -> DetectorResult<T>
where
    F: Future<Output = DetectorResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(answer) => answer,
        Err(_) => Err(DetectorError::Timeout(limit)),
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if cancel.changed().await.is_err() {
            // Sender gone: cancellation can no longer happen.
            std::future::pending::<()>().await;
        }
        if *cancel.borrow() {
            return;
        }
    }
}
