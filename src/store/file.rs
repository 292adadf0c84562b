use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::{
    AlertLedger, BaselineProvider, BaselineStore, ProjectDirectory, ReportRecord, ReportStore,
};
use crate::config::DataPaths;
use crate::domain::{Actor, Alert, Project, ProjectBaseline, sort_newest_first};
use crate::error::{Result, SentryError};
use crate::utils::file_stem;

/// YAML-file store: one file per project and record kind.
///
/// Every write holds a per-file async lock plus an exclusive advisory lock on
/// `<file>.lock`, then renames a temp file into place. Tasks in one process
/// and separate processes sharing a data dir never drop records.
pub struct FileStore {
    paths: DataPaths,
    locks: parking_lot::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileStore {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(DataPaths::new(root));
        store.init().await?;
        Ok(store)
    }

    pub async fn init(&self) -> Result<()> {
        self.paths.ensure_dirs().await?;
        for dir in [
            &self.paths.projects_dir,
            &self.paths.baselines_dir,
            &self.paths.reports_dir,
            &self.paths.alerts_dir,
        ] {
            recover_interrupted_writes(dir).await;
        }
        Ok(())
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn file_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    async fn lock_for_write(&self, path: &Path) -> Result<WriteGuard> {
        let process = self.file_lock(path).lock_owned().await;
        let file = lock_across_processes(path).await?;
        Ok(WriteGuard {
            _file: file,
            _process: process,
        })
    }

    fn project_file(dir: &Path, project_id: &str) -> PathBuf {
        dir.join(format!("{}.yaml", file_stem(project_id)))
    }

    async fn append<T>(&self, path: &Path, items: &[T]) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync,
    {
        let _guard = self.lock_for_write(path).await?;

        let mut existing: Vec<T> = read_yaml(path).await?.unwrap_or_default();
        existing.extend_from_slice(items);
        write_atomic(path, &serde_yaml_bw::to_string(&existing)?).await
    }

    async fn project_alert_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if !self.paths.alerts_dir.exists() {
            return Ok(files);
        }
        let mut entries = fs::read_dir(&self.paths.alerts_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Held for the duration of one read-modify-write. The advisory lock is
/// released when the file handle closes.
struct WriteGuard {
    _file: std::fs::File,
    _process: OwnedMutexGuard<()>,
}

async fn lock_across_processes(path: &Path) -> Result<std::fs::File> {
    let lock_path = path.with_extension("yaml.lock");
    tokio::task::spawn_blocking(move || -> std::io::Result<std::fs::File> {
        // Never truncate: another process may hold the lock on this inode.
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        file.lock()?;
        Ok(file)
    })
    .await
    .map_err(|e| SentryError::StoreUnavailable(format!("lock task failed: {}", e)))?
    .map_err(|e| SentryError::StoreUnavailable(format!("{}: {}", path.display(), e)))
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_yaml_bw::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SentryError::StoreUnavailable(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

async fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("yaml.tmp");

    fs::write(&tmp_path, content).await?;

    let tmp_path_clone = tmp_path.clone();
    let sync_result = tokio::task::spawn_blocking(move || {
        std::fs::File::open(&tmp_path_clone).and_then(|file| file.sync_all())
    })
    .await;

    match sync_result {
        Err(e) => warn!(error = %e, "Failed to sync temp file to disk"),
        Ok(Err(e)) => warn!(error = %e, "Failed to sync temp file to disk"),
        Ok(Ok(())) => {}
    }

    fs::rename(&tmp_path, path).await?;

    debug!(path = %path.display(), "Atomic write completed");
    Ok(())
}

async fn recover_interrupted_writes(dir: &Path) {
    if let Ok(mut entries) = fs::read_dir(dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "tmp") {
                debug!(path = %path.display(), "Removing interrupted write");
                let _ = fs::remove_file(&path).await;
            }
        }
    }
}

#[async_trait]
impl BaselineProvider for FileStore {
    async fn get_baseline(&self, project_id: &str) -> Result<Option<ProjectBaseline>> {
        let stored: Option<ProjectBaseline> =
            read_yaml(&Self::project_file(&self.paths.baselines_dir, project_id)).await?;
        Ok(stored.filter(|b| b.project_id == project_id))
    }
}

#[async_trait]
impl BaselineStore for FileStore {
    async fn set_baseline(&self, baseline: ProjectBaseline) -> Result<()> {
        let baseline = baseline.normalized();
        let path = Self::project_file(&self.paths.baselines_dir, &baseline.project_id);
        let _guard = self.lock_for_write(&path).await?;
        write_atomic(&path, &serde_yaml_bw::to_string(&baseline)?).await
    }
}

#[async_trait]
impl AlertLedger for FileStore {
    async fn append_alerts(&self, alerts: &[Alert]) -> Result<()> {
        let mut by_project: HashMap<&str, Vec<Alert>> = HashMap::new();
        for alert in alerts {
            by_project
                .entry(alert.project_id.as_str())
                .or_default()
                .push(alert.clone());
        }
        for (project_id, batch) in by_project {
            let path = Self::project_file(&self.paths.alerts_dir, project_id);
            self.append(&path, &batch).await?;
        }
        Ok(())
    }

    async fn list_alerts(&self, project_id: Option<&str>) -> Result<Vec<Alert>> {
        let files = match project_id {
            Some(id) => vec![Self::project_file(&self.paths.alerts_dir, id)],
            None => self.project_alert_files().await?,
        };

        let mut alerts = Vec::new();
        for path in files {
            let batch: Vec<Alert> = read_yaml(&path).await?.unwrap_or_default();
            alerts.extend(batch);
        }
        if let Some(id) = project_id {
            alerts.retain(|a| a.project_id == id);
        }
        sort_newest_first(&mut alerts);
        Ok(alerts)
    }

    async fn set_resolved(&self, alert_id: &str, resolved: bool, actor: &Actor) -> Result<Alert> {
        for path in self.project_alert_files().await? {
            let _guard = self.lock_for_write(&path).await?;

            let mut alerts: Vec<Alert> = read_yaml(&path).await?.unwrap_or_default();
            let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) else {
                continue;
            };
            if resolved {
                alert.mark_resolved(&actor.email);
            } else {
                alert.reopen();
            }
            let updated = alert.clone();
            write_atomic(&path, &serde_yaml_bw::to_string(&alerts)?).await?;
            return Ok(updated);
        }
        Err(SentryError::AlertNotFound(alert_id.to_string()))
    }
}

#[async_trait]
impl ReportStore for FileStore {
    async fn save_report(&self, record: &ReportRecord) -> Result<()> {
        let path = Self::project_file(&self.paths.reports_dir, &record.report.project_id);
        self.append(&path, std::slice::from_ref(record)).await
    }

    async fn list_reports(&self, project_id: &str) -> Result<Vec<ReportRecord>> {
        let path = Self::project_file(&self.paths.reports_dir, project_id);
        let records: Vec<ReportRecord> = read_yaml(&path).await?.unwrap_or_default();
        Ok(records
            .into_iter()
            .filter(|r| r.report.project_id == project_id)
            .collect())
    }
}

#[async_trait]
impl ProjectDirectory for FileStore {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let stored: Option<Project> =
            read_yaml(&Self::project_file(&self.paths.projects_dir, project_id)).await?;
        Ok(stored.filter(|p| p.id == project_id))
    }

    async fn put_project(&self, project: Project) -> Result<()> {
        let path = Self::project_file(&self.paths.projects_dir, &project.id);
        let _guard = self.lock_for_write(&path).await?;
        write_atomic(&path, &serde_yaml_bw::to_string(&project)?).await
    }
}
