use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    OnTrack,
    AtRisk,
    Delayed,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnTrack => write!(f, "on-track"),
            Self::AtRisk => write!(f, "at-risk"),
            Self::Delayed => write!(f, "delayed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub progress_percent: u8,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: String::new(),
            owner_email: String::new(),
            status: ProjectStatus::default(),
            progress_percent: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_progress(mut self, percent: u8) -> Self {
        self.progress_percent = percent.min(100);
        self
    }

    pub fn with_owner(mut self, email: impl Into<String>) -> Self {
        self.owner_email = email.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamped() {
        let project = Project::new("proj-1", "Green Valley Residency").with_progress(140);
        assert_eq!(project.progress_percent, 100);
    }

    #[test]
    fn test_status_serde() {
        let project: Project = serde_json::from_str(
            r#"{"id":"proj-3","name":"Highway Bridge Expansion","status":"at-risk","progress_percent":22}"#,
        )
        .unwrap();
        assert_eq!(project.status, ProjectStatus::AtRisk);
        assert_eq!(project.status.to_string(), "at-risk");
        assert_eq!(project.progress_percent, 22);
    }
}
