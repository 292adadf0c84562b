use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Result, SentryError};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentryConfig {
    pub verification: VerificationConfig,
    pub summary: SummaryConfig,
    pub notification: NotificationConfig,
    pub storage: StorageConfig,
}

impl SentryConfig {
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(data_dir).await?;
        let content =
            toml::to_string_pretty(self).map_err(|e| SentryError::Config(e.to_string()))?;
        fs::write(data_dir.join(CONFIG_FILE), content).await?;
        Ok(())
    }

    /// Validate configuration values for consistency.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        let v = &self.verification;
        if !v.gps_tolerance_meters.is_finite() || v.gps_tolerance_meters <= 0.0 {
            errors.push("verification.gps_tolerance_meters must be a positive number");
        }
        if !v.material_overage_ratio.is_finite() || v.material_overage_ratio < 1.0 {
            errors.push("verification.material_overage_ratio must be >= 1.0");
        }
        if v.detector_timeout_secs == 0 {
            errors.push("verification.detector_timeout_secs must be greater than 0");
        }

        if self.summary.max_alert_chars == 0 {
            errors.push("summary.max_alert_chars must be greater than 0");
        }

        if let Some(hook) = &self.notification.hook_command
            && hook.trim().is_empty()
        {
            errors.push("notification.hook_command must not be blank when set");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SentryError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Thresholds for the report verification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Maximum distance between report GPS and project site (default: 100m)
    pub gps_tolerance_meters: f64,
    /// Allowed difference between reported and detected workers, both directions
    pub worker_tolerance: u32,
    /// Cumulative usage may exceed the planned quantity by this factor
    pub material_overage_ratio: f64,
    /// Upper bound for each detector call
    pub detector_timeout_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            gps_tolerance_meters: 100.0,
            worker_tolerance: 3,
            material_overage_ratio: 1.1,
            detector_timeout_secs: 10,
        }
    }
}

impl VerificationConfig {
    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub max_alert_chars: usize,
    pub closing_remark: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_alert_chars: 100,
            closing_remark: "Material consumption is within acceptable range.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub event_log: bool,
    pub hook_command: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            event_log: true,
            hook_command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".site-sentry"),
        }
    }
}

/// On-disk layout below the data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
    pub projects_dir: PathBuf,
    pub baselines_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub alerts_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            projects_dir: root.join("projects"),
            baselines_dir: root.join("baselines"),
            reports_dir: root.join("reports"),
            alerts_dir: root.join("alerts"),
            logs_dir: root.join("logs"),
            root,
        }
    }

    pub async fn ensure_dirs(&self) -> Result<()> {
        let dirs = [
            &self.root,
            &self.projects_dir,
            &self.baselines_dir,
            &self.reports_dir,
            &self.alerts_dir,
            &self.logs_dir,
        ];

        for dir in dirs {
            fs::create_dir_all(dir).await?;
        }

        Ok(())
    }
}
