use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{
    AlertLedger, BaselineProvider, BaselineStore, ProjectDirectory, ReportRecord, ReportStore,
};
use crate::domain::{Actor, Alert, Project, ProjectBaseline, sort_newest_first};
use crate::error::{Result, SentryError};

/// In-process store. Each append takes the write lock once, so concurrent
/// verification runs never lose alerts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Project>>,
    baselines: RwLock<HashMap<String, ProjectBaseline>>,
    reports: RwLock<HashMap<String, Vec<ReportRecord>>>,
    alerts: RwLock<HashMap<String, Vec<Alert>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.read().values().map(Vec::len).sum()
    }

    pub fn report_count(&self) -> usize {
        self.reports.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl BaselineProvider for MemoryStore {
    async fn get_baseline(&self, project_id: &str) -> Result<Option<ProjectBaseline>> {
        Ok(self.baselines.read().get(project_id).cloned())
    }
}

#[async_trait]
impl BaselineStore for MemoryStore {
    async fn set_baseline(&self, baseline: ProjectBaseline) -> Result<()> {
        let baseline = baseline.normalized();
        self.baselines
            .write()
            .insert(baseline.project_id.clone(), baseline);
        Ok(())
    }
}

#[async_trait]
impl AlertLedger for MemoryStore {
    async fn append_alerts(&self, alerts: &[Alert]) -> Result<()> {
        let mut ledger = self.alerts.write();
        for alert in alerts {
            ledger
                .entry(alert.project_id.clone())
                .or_default()
                .push(alert.clone());
        }
        Ok(())
    }

    async fn list_alerts(&self, project_id: Option<&str>) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = {
            let ledger = self.alerts.read();
            match project_id {
                Some(id) => ledger.get(id).cloned().unwrap_or_default(),
                None => ledger.values().flatten().cloned().collect(),
            }
        };
        sort_newest_first(&mut alerts);
        Ok(alerts)
    }

    async fn set_resolved(&self, alert_id: &str, resolved: bool, actor: &Actor) -> Result<Alert> {
        let mut ledger = self.alerts.write();
        let alert = ledger
            .values_mut()
            .flat_map(|alerts| alerts.iter_mut())
            .find(|a| a.id == alert_id)
            .ok_or_else(|| SentryError::AlertNotFound(alert_id.to_string()))?;

        if resolved {
            alert.mark_resolved(&actor.email);
        } else {
            alert.reopen();
        }
        Ok(alert.clone())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn save_report(&self, record: &ReportRecord) -> Result<()> {
        self.reports
            .write()
            .entry(record.report.project_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn list_reports(&self, project_id: &str) -> Result<Vec<ReportRecord>> {
        Ok(self
            .reports
            .read()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProjectDirectory for MemoryStore {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self.projects.read().get(project_id).cloned())
    }

    async fn put_project(&self, project: Project) -> Result<()> {
        self.projects.write().insert(project.id.clone(), project);
        Ok(())
    }
}
