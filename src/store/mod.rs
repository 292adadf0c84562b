//! Persistence boundary.
//!
//! The verification engine owns no state. Everything it reads or emits
//! crosses one of these ports:
//! - `BaselineProvider` / `BaselineStore`: project roadmaps
//! - `AlertLedger`: append-only alerts with resolution state
//! - `ReportStore`: submitted reports and their verdicts
//! - `ProjectDirectory`: project name and progress for summaries
//!
//! `MemoryStore` backs tests; `FileStore` keeps YAML files under a data
//! directory. Both serialize appends per project.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::domain::{Actor, Alert, Project, ProjectBaseline, Report};
use crate::error::Result;
use crate::verification::VerificationResult;

/// Read-only baseline lookup. `Ok(None)` means no roadmap has been defined.
#[async_trait]
pub trait BaselineProvider: Send + Sync {
    async fn get_baseline(&self, project_id: &str) -> Result<Option<ProjectBaseline>>;
}

#[async_trait]
pub trait BaselineStore: BaselineProvider {
    /// Replaces any existing baseline for the project.
    async fn set_baseline(&self, baseline: ProjectBaseline) -> Result<()>;
}

#[async_trait]
pub trait AlertLedger: Send + Sync {
    /// Stores all alerts or none of them.
    async fn append_alerts(&self, alerts: &[Alert]) -> Result<()>;

    /// Alerts sorted newest first, optionally for one project.
    async fn list_alerts(&self, project_id: Option<&str>) -> Result<Vec<Alert>>;

    async fn set_resolved(&self, alert_id: &str, resolved: bool, actor: &Actor) -> Result<Alert>;

    async fn open_alerts(&self, project_id: &str) -> Result<Vec<Alert>> {
        let alerts = self.list_alerts(Some(project_id)).await?;
        Ok(alerts.into_iter().filter(Alert::is_open).collect())
    }
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save_report(&self, record: &ReportRecord) -> Result<()>;

    /// Reports for a project in submission order.
    async fn list_reports(&self, project_id: &str) -> Result<Vec<ReportRecord>>;
}

#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>>;

    async fn put_project(&self, project: Project) -> Result<()>;
}

/// A submitted report together with the verdict it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report: Report,
    pub verified: bool,
    pub notes: String,
    #[serde(default)]
    pub alert_ids: Vec<String>,
}

impl ReportRecord {
    pub fn new(report: Report, verification: &VerificationResult, alerts: &[Alert]) -> Self {
        Self {
            report,
            verified: verification.verified,
            notes: verification.notes.clone(),
            alert_ids: alerts.iter().map(|a| a.id.clone()).collect(),
        }
    }
}
