use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::AlertEvent;
use crate::config::NotificationConfig;
use crate::utils::file_stem;

/// Delivers alert events to the per-project event log and an optional hook.
///
/// Delivery is best effort: failures are logged and never surface to the
/// caller.
#[derive(Clone)]
pub struct Notifier {
    config: NotificationConfig,
    logs_dir: Option<PathBuf>,
}

impl Notifier {
    pub fn new(config: NotificationConfig, logs_dir: Option<PathBuf>) -> Self {
        Self { config, logs_dir }
    }

    pub async fn notify(&self, event: &AlertEvent) {
        if !self.config.enabled {
            return;
        }

        if self.config.event_log {
            self.write_event_log(event).await;
        }

        if let Some(hook) = &self.config.hook_command {
            self.run_hook(hook, event).await;
        }
    }

    async fn write_event_log(&self, event: &AlertEvent) {
        let Some(logs_dir) = &self.logs_dir else {
            return;
        };

        let log_path = logs_dir.join(format!("{}.log", file_stem(event.project_id())));

        if let Err(e) = tokio::fs::create_dir_all(logs_dir).await {
            warn!(error = %e, "Failed to create logs directory");
            return;
        }

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .await;

        match result {
            Ok(mut file) => {
                if let Err(e) = file.write_all(event.log_line().as_bytes()).await {
                    warn!(error = %e, "Failed to write event log");
                }
            }
            Err(e) => {
                warn!(error = %e, path = %log_path.display(), "Failed to open event log");
            }
        }
    }

    async fn run_hook(&self, hook_cmd: &str, event: &AlertEvent) {
        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(_) => return,
        };

        let result = Command::new("sh")
            .args(["-c", hook_cmd])
            .env("SENTRY_EVENT", event.event_type.as_str())
            .env("SENTRY_PROJECT_ID", event.project_id())
            .env("SENTRY_ALERT_JSON", &json)
            .output()
            .await;

        if let Err(e) = result {
            debug!(error = %e, hook = %hook_cmd, "Failed to run hook");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Alert, AlertSeverity};

    #[tokio::test]
    async fn test_event_log_appends_per_project() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Notifier::new(
            NotificationConfig::default(),
            Some(dir.path().join("logs")),
        );

        let first = Alert::new("proj-1", AlertSeverity::High, "GPS location mismatch");
        let second = Alert::new("proj-1", AlertSeverity::Medium, "Material usage exceeds plan");
        notifier.notify(&AlertEvent::raised(first)).await;
        notifier.notify(&AlertEvent::raised(second)).await;

        let log = std::fs::read_to_string(dir.path().join("logs/proj-1.log")).unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.contains("GPS location mismatch"));
    }

    #[tokio::test]
    async fn test_event_log_stays_inside_logs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs_dir = dir.path().join("data").join("logs");
        let notifier = Notifier::new(NotificationConfig::default(), Some(logs_dir.clone()));

        let alert = Alert::new("../../escaped", AlertSeverity::High, "GPS location mismatch");
        notifier.notify(&AlertEvent::raised(alert)).await;

        assert!(!dir.path().join("escaped.log").exists());
        let log = std::fs::read_to_string(logs_dir.join("%2E%2E%2F%2E%2E%2Fescaped.log")).unwrap();
        assert!(log.contains("GPS location mismatch"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_notifier_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = NotificationConfig {
            enabled: false,
            ..Default::default()
        };
        let notifier = Notifier::new(config, Some(dir.path().to_path_buf()));
        notifier
            .notify(&AlertEvent::raised(Alert::new(
                "proj-1",
                AlertSeverity::Low,
                "ignored",
            )))
            .await;
        assert!(!dir.path().join("proj-1.log").exists());
    }
}
