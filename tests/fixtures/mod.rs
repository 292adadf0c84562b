//! Shared builders and store doubles for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use site_sentry::detection::{DetectorResult, MaterialHistory};
use site_sentry::domain::{
    Actor, Alert, MaterialEntry, Project, ProjectBaseline, ReportSubmission, Role,
};
use site_sentry::error::{Result, SentryError};
use site_sentry::geo::Coordinate;
use site_sentry::store::{
    AlertLedger, BaselineProvider, BaselineStore, MemoryStore, ProjectDirectory, ReportRecord,
    ReportStore,
};

pub const PROJECT_ID: &str = "proj-jaipur-1";

pub fn site() -> Coordinate {
    Coordinate::new(26.9124, 75.7873)
}

pub fn contractor() -> Actor {
    Actor::new("contractor@site.test", Role::Contractor)
}

pub fn engineer() -> Actor {
    Actor::new("engineer@site.test", Role::Engineer)
}

pub fn owner() -> Actor {
    Actor::new("owner@site.test", Role::Owner)
}

pub fn project() -> Project {
    Project::new(PROJECT_ID, "Green Valley Residency")
        .with_location("Jaipur")
        .with_owner("owner@site.test")
        .with_progress(67)
}

/// Baseline with the site coordinate and 500 bags of cement planned.
pub fn baseline() -> ProjectBaseline {
    ProjectBaseline::new(PROJECT_ID)
        .with_site(site())
        .with_material("Cement", 500.0)
}

/// Submission at the site with 12 workers and a unique photo reference.
pub fn submission(photo: &str) -> ReportSubmission {
    ReportSubmission::new(PROJECT_ID, photo)
        .with_gps(26.9124, 75.7873)
        .with_worker_count(12)
}

pub fn cement(quantity: f64) -> MaterialEntry {
    MaterialEntry::new("Cement", quantity, "bags")
}

/// Fixed material history.
pub struct FixedHistory(pub Vec<MaterialEntry>);

#[async_trait]
impl MaterialHistory for FixedHistory {
    async fn material_history(&self, _project_id: &str) -> DetectorResult<Vec<MaterialEntry>> {
        Ok(self.0.clone())
    }
}

/// Memory store that counts write attempts and can refuse them.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
    fail_writes: bool,
    fail_report_writes: bool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_writes: true,
            ..Self::default()
        })
    }

    /// Accepts alert appends but refuses report records.
    pub fn failing_reports() -> Arc<Self> {
        Arc::new(Self {
            fail_report_writes: true,
            ..Self::default()
        })
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn attempt_write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            Err(SentryError::StoreUnavailable("disk full".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BaselineProvider for RecordingStore {
    async fn get_baseline(&self, project_id: &str) -> Result<Option<ProjectBaseline>> {
        self.inner.get_baseline(project_id).await
    }
}

#[async_trait]
impl BaselineStore for RecordingStore {
    async fn set_baseline(&self, baseline: ProjectBaseline) -> Result<()> {
        self.inner.set_baseline(baseline).await
    }
}

#[async_trait]
impl AlertLedger for RecordingStore {
    async fn append_alerts(&self, alerts: &[Alert]) -> Result<()> {
        self.attempt_write()?;
        self.inner.append_alerts(alerts).await
    }

    async fn list_alerts(&self, project_id: Option<&str>) -> Result<Vec<Alert>> {
        self.inner.list_alerts(project_id).await
    }

    async fn set_resolved(&self, alert_id: &str, resolved: bool, actor: &Actor) -> Result<Alert> {
        self.inner.set_resolved(alert_id, resolved, actor).await
    }
}

#[async_trait]
impl ReportStore for RecordingStore {
    async fn save_report(&self, record: &ReportRecord) -> Result<()> {
        self.attempt_write()?;
        if self.fail_report_writes {
            return Err(SentryError::StoreUnavailable("reports volume read-only".into()));
        }
        self.inner.save_report(record).await
    }

    async fn list_reports(&self, project_id: &str) -> Result<Vec<ReportRecord>> {
        self.inner.list_reports(project_id).await
    }
}

#[async_trait]
impl ProjectDirectory for RecordingStore {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        self.inner.get_project(project_id).await
    }

    async fn put_project(&self, project: Project) -> Result<()> {
        self.inner.put_project(project).await
    }
}
