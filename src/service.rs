//! Boundary operations used by the submission flow: submit, alert query,
//! resolution, baseline set/get, projects and summaries.
//!
//! The authenticated identity is always an explicit [`Actor`] argument.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SentryConfig;
use crate::detection::{
    ImageDuplicateDetector, PhotoHistoryDetector, StoredMaterialHistory, WorkerCountEstimator,
};
use crate::domain::{Actor, Alert, Project, ProjectBaseline, Report, ReportSubmission};
use crate::error::{Result, SentryError};
use crate::notification::{AlertEvent, Notifier};
use crate::store::{
    AlertLedger, BaselineProvider, BaselineStore, FileStore, MemoryStore, ProjectDirectory,
    ReportRecord, ReportStore,
};
use crate::summary::{ProjectSummary, SummaryBuilder};
use crate::verification::{VerificationEngine, VerificationResult};

/// Warning attached to a submission whose verdict could not be persisted.
pub const NOT_SAVED_WARNING: &str = "result computed but not durably saved";

/// The persistence ports a [`SiteOfficer`] works against.
#[derive(Clone)]
pub struct Stores {
    pub reports: Arc<dyn ReportStore>,
    pub alerts: Arc<dyn AlertLedger>,
    pub baselines: Arc<dyn BaselineStore>,
    pub projects: Arc<dyn ProjectDirectory>,
}

impl Stores {
    /// All four ports served by one backing store.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ReportStore + AlertLedger + BaselineStore + ProjectDirectory + 'static,
    {
        Self {
            reports: store.clone(),
            alerts: store.clone(),
            baselines: store.clone(),
            projects: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::shared(Arc::new(MemoryStore::new()))
    }

    pub fn from_file_store(store: Arc<FileStore>) -> Self {
        Self::shared(store)
    }
}

#[derive(Clone)]
pub struct Detectors {
    pub duplicates: Arc<dyn ImageDuplicateDetector>,
    pub workers: Arc<dyn WorkerCountEstimator>,
}

impl Detectors {
    pub fn new(
        duplicates: Arc<dyn ImageDuplicateDetector>,
        workers: Arc<dyn WorkerCountEstimator>,
    ) -> Self {
        Self {
            duplicates,
            workers,
        }
    }

    /// Duplicate detection answered from previously stored reports.
    pub fn store_backed(
        reports: Arc<dyn ReportStore>,
        workers: Arc<dyn WorkerCountEstimator>,
    ) -> Self {
        Self::new(Arc::new(PhotoHistoryDetector::new(reports)), workers)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub report: Report,
    pub verification: VerificationResult,
    /// Alerts raised for this report, as stored in the ledger.
    pub alerts: Vec<Alert>,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub struct SiteOfficer {
    stores: Stores,
    engine: VerificationEngine,
    notifier: Notifier,
    summaries: SummaryBuilder,
}

impl SiteOfficer {
    pub fn new(config: SentryConfig, stores: Stores, detectors: Detectors) -> Self {
        let baselines: Arc<dyn BaselineProvider> = stores.baselines.clone();
        let engine = VerificationEngine::new(
            config.verification.clone(),
            baselines,
            detectors.duplicates,
            detectors.workers,
        )
        .with_material_history(Arc::new(StoredMaterialHistory::new(stores.reports.clone())));

        Self {
            stores,
            engine,
            notifier: Notifier::new(config.notification.clone(), None),
            summaries: SummaryBuilder::new(config.summary),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    /// Validate, verify and persist one report.
    ///
    /// Malformed input fails before anything is written. Alerts are
    /// appended before the report record. A persistence failure after
    /// verification keeps the verdict and sets `persisted = false` with a
    /// warning naming what was saved.
    pub async fn submit_report(
        &self,
        actor: &Actor,
        submission: ReportSubmission,
    ) -> Result<SubmissionOutcome> {
        let report = submission.into_report(actor)?;
        let verification = self.engine.verify(&report).await?;
        let alerts = verification.to_alerts(&report);

        let mut warnings = Vec::new();
        let alerts_recorded = match self.record_alerts(&alerts).await {
            Ok(()) => true,
            Err(e) => {
                warn!(report_id = %report.id, error = %e, "Failed to record alerts");
                warnings.push(format!("{}: {}", NOT_SAVED_WARNING, e));
                false
            }
        };

        // A stored record only references alerts already in the ledger.
        let persisted = alerts_recorded && {
            let record = ReportRecord::new(report.clone(), &verification, &alerts);
            match self.stores.reports.save_report(&record).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(report_id = %report.id, error = %e, "Failed to persist report record");
                    let warning = if alerts.is_empty() {
                        format!("{}: {}", NOT_SAVED_WARNING, e)
                    } else {
                        format!(
                            "{}: alerts were recorded but the report record was not: {}",
                            NOT_SAVED_WARNING, e
                        )
                    };
                    warnings.push(warning);
                    false
                }
            }
        };

        if alerts_recorded {
            let events: Vec<AlertEvent> = alerts.iter().cloned().map(AlertEvent::raised).collect();
            join_all(events.iter().map(|event| self.notifier.notify(event))).await;
        }

        info!(
            report_id = %report.id,
            project_id = %report.project_id,
            submitted_by = %actor.email,
            verified = verification.verified,
            persisted,
            "Report submitted"
        );

        Ok(SubmissionOutcome {
            report,
            verification,
            alerts,
            persisted,
            warnings,
        })
    }

    async fn record_alerts(&self, alerts: &[Alert]) -> Result<()> {
        if alerts.is_empty() {
            return Ok(());
        }
        self.stores.alerts.append_alerts(alerts).await
    }

    pub async fn list_alerts(&self, project_id: Option<&str>) -> Result<Vec<Alert>> {
        self.stores.alerts.list_alerts(project_id).await
    }

    /// Flip an alert's resolution state. Verification is not re-run.
    pub async fn resolve_alert(&self, actor: &Actor, alert_id: &str, resolved: bool) -> Result<Alert> {
        let alert = self
            .stores
            .alerts
            .set_resolved(alert_id, resolved, actor)
            .await?;
        info!(alert_id = %alert.id, resolved, by = %actor.email, "Alert resolution updated");
        self.notifier
            .notify(&AlertEvent::resolution(alert.clone()))
            .await;
        Ok(alert)
    }

    /// Overwrite the project's baseline.
    pub async fn set_baseline(
        &self,
        actor: &Actor,
        mut baseline: ProjectBaseline,
    ) -> Result<ProjectBaseline> {
        if baseline.project_id.trim().is_empty() {
            return Err(SentryError::validation("project_id", "is required"));
        }
        if let Some((name, _)) = baseline
            .materials
            .iter()
            .find(|(_, planned)| !planned.is_finite() || **planned < 0.0)
        {
            return Err(SentryError::validation(
                "materials",
                format!("planned quantity for {} must be a non-negative number", name),
            ));
        }
        if let Some(site) = baseline.site
            && !site.is_finite()
        {
            return Err(SentryError::validation("site", "coordinate is not numeric"));
        }

        baseline.set_by = Some(actor.email.clone());
        baseline.updated_at = Utc::now();
        let baseline = baseline.normalized();

        self.stores.baselines.set_baseline(baseline.clone()).await?;
        info!(project_id = %baseline.project_id, by = %actor.email, "Baseline updated");
        Ok(baseline)
    }

    pub async fn get_baseline(&self, project_id: &str) -> Result<ProjectBaseline> {
        self.stores
            .baselines
            .get_baseline(project_id)
            .await?
            .ok_or_else(|| SentryError::BaselineNotFound(project_id.to_string()))
    }

    pub async fn add_project(&self, project: Project) -> Result<()> {
        if project.id.trim().is_empty() {
            return Err(SentryError::validation("project_id", "is required"));
        }
        self.stores.projects.put_project(project).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.stores
            .projects
            .get_project(project_id)
            .await?
            .ok_or_else(|| SentryError::ProjectNotFound(project_id.to_string()))
    }

    pub async fn project_summary(&self, project_id: &str) -> Result<ProjectSummary> {
        let project = self.get_project(project_id).await?;
        let open = self.stores.alerts.open_alerts(project_id).await?;
        Ok(self.summaries.summarize(&project, &open))
    }
}
