use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Alert;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AlertRaised,
    AlertResolved,
    AlertReopened,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlertRaised => "alert.raised",
            Self::AlertResolved => "alert.resolved",
            Self::AlertReopened => "alert.reopened",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub event_type: EventType,
    pub alert: Alert,
    pub created_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(event_type: EventType, alert: Alert) -> Self {
        Self {
            event_type,
            alert,
            created_at: Utc::now(),
        }
    }

    pub fn raised(alert: Alert) -> Self {
        Self::new(EventType::AlertRaised, alert)
    }

    pub fn resolution(alert: Alert) -> Self {
        let event_type = if alert.resolved {
            EventType::AlertResolved
        } else {
            EventType::AlertReopened
        };
        Self::new(event_type, alert)
    }

    pub fn project_id(&self) -> &str {
        &self.alert.project_id
    }

    pub fn log_line(&self) -> String {
        format!(
            "[{}] {} {} [{}] {}\n",
            self.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
            self.event_type.as_str(),
            self.alert.id,
            self.alert.severity,
            self.alert.message
        )
    }
}
