//! Spoken-style project status lines built from open alerts.

use serde::{Deserialize, Serialize};

use crate::config::SummaryConfig;
use crate::domain::{Alert, AlertSeverity, Project};
use crate::utils::{count_noun, take_chars};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    /// Counts unresolved alerts only.
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut counts = Self::default();
        for alert in alerts.iter().filter(|a| a.is_open()) {
            match alert.severity {
                AlertSeverity::High => counts.high += 1,
                AlertSeverity::Medium => counts.medium += 1,
                AlertSeverity::Low => counts.low += 1,
                AlertSeverity::Info => counts.info += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.info
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub summary: String,
    pub counts: SeverityCounts,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryBuilder {
    config: SummaryConfig,
}

impl SummaryBuilder {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, project: &Project, open_alerts: &[Alert]) -> String {
        let open: Vec<&Alert> = open_alerts.iter().filter(|a| a.is_open()).collect();

        let mut summary = format!(
            "Project {} is {}% complete. ",
            project.name, project.progress_percent
        );

        match most_severe(&open) {
            Some(alert) => {
                summary.push_str(&format!(
                    "You have {} open. ",
                    count_noun(open.len(), "alert")
                ));
                let excerpt = take_chars(&alert.message, self.config.max_alert_chars);
                summary.push_str(&format!(
                    "The most critical is: {}. ",
                    excerpt.trim_end().trim_end_matches('.')
                ));
            }
            None => summary.push_str("No open alerts. Everything is on track. "),
        }

        summary.push_str(&self.config.closing_remark);
        summary
    }

    pub fn summarize(&self, project: &Project, open_alerts: &[Alert]) -> ProjectSummary {
        ProjectSummary {
            project_id: project.id.clone(),
            summary: self.build(project, open_alerts),
            counts: SeverityCounts::from_alerts(open_alerts),
        }
    }
}

/// Status paragraph with the default length bound and closing remark.
pub fn build_summary(project: &Project, open_alerts: &[Alert]) -> String {
    SummaryBuilder::default().build(project, open_alerts)
}

/// Highest severity wins; the newest alert breaks ties.
fn most_severe<'a>(alerts: &[&'a Alert]) -> Option<&'a Alert> {
    alerts
        .iter()
        .copied()
        .max_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.created_at.cmp(&b.created_at))
        })
}
