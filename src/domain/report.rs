use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentryError};
use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Engineer,
    Contractor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Engineer => write!(f, "engineer"),
            Self::Contractor => write!(f, "contractor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = SentryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "engineer" => Ok(Self::Engineer),
            "contractor" => Ok(Self::Contractor),
            other => Err(SentryError::validation(
                "role",
                format!("'{}' is not one of owner, engineer, contractor", other),
            )),
        }
    }
}

/// Authenticated identity on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }
}

/// Opaque handle to a stored photo. Only detectors look behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(String);

impl PhotoRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl MaterialEntry {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }

    /// Case-insensitive lookup key shared with baseline material plans.
    pub fn key(&self) -> String {
        material_key(&self.name)
    }
}

pub fn material_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Raw daily-progress submission as received from the field.
///
/// Required fields are optional here so that a missing value surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSubmission {
    pub project_id: String,
    pub photo: String,
    pub gps_lat: Option<f64>,
    pub gps_lng: Option<f64>,
    pub worker_count: Option<i64>,
    pub materials: Vec<MaterialEntry>,
    pub voice_transcript: Option<String>,
    pub captured_at: Option<DateTime<Utc>>,
    pub device_id: Option<String>,
}

impl ReportSubmission {
    pub fn new(project_id: impl Into<String>, photo: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            photo: photo.into(),
            ..Default::default()
        }
    }

    pub fn with_gps(mut self, lat: f64, lng: f64) -> Self {
        self.gps_lat = Some(lat);
        self.gps_lng = Some(lng);
        self
    }

    pub fn with_worker_count(mut self, count: i64) -> Self {
        self.worker_count = Some(count);
        self
    }

    pub fn with_material(mut self, entry: MaterialEntry) -> Self {
        self.materials.push(entry);
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.voice_transcript = Some(transcript.into());
        self
    }

    /// Validate and freeze into an immutable [`Report`].
    pub fn into_report(self, submitter: &Actor) -> Result<Report> {
        let location = match (self.gps_lat, self.gps_lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
            (None, _) => return Err(SentryError::validation("gps_lat", "is required")),
            (_, None) => return Err(SentryError::validation("gps_lng", "is required")),
        };
        let worker_count = match self.worker_count {
            Some(n) if n < 0 => {
                return Err(SentryError::validation(
                    "worker_count",
                    format!("must be >= 0, got {}", n),
                ));
            }
            Some(n) => u32::try_from(n).map_err(|_| {
                SentryError::validation("worker_count", format!("{} is out of range", n))
            })?,
            None => return Err(SentryError::validation("worker_count", "is required")),
        };

        let report = Report {
            id: format!("rpt-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
            project_id: self.project_id.trim().to_string(),
            submitted_by: submitter.email.clone(),
            submitter_role: submitter.role,
            photo: PhotoRef::new(self.photo),
            location,
            captured_at: self.captured_at.unwrap_or_else(Utc::now),
            worker_count,
            materials: self.materials,
            voice_transcript: self.voice_transcript.filter(|t| !t.trim().is_empty()),
            device_id: self.device_id,
        };
        report.validate()?;
        Ok(report)
    }
}

/// One accepted daily-progress submission. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub project_id: String,
    pub submitted_by: String,
    pub submitter_role: Role,
    pub photo: PhotoRef,
    pub location: Coordinate,
    pub captured_at: DateTime<Utc>,
    pub worker_count: u32,
    pub materials: Vec<MaterialEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Report {
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(SentryError::validation("project_id", "is required"));
        }
        if !self.location.is_finite() {
            return Err(SentryError::validation(
                "gps",
                format!("coordinate {:?} is not numeric", self.location),
            ));
        }
        for entry in &self.materials {
            if entry.name.trim().is_empty() {
                return Err(SentryError::validation("materials", "entry without a name"));
            }
            if !entry.quantity.is_finite() || entry.quantity < 0.0 {
                return Err(SentryError::validation(
                    "materials",
                    format!("quantity for {} must be a non-negative number", entry.name),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contractor() -> Actor {
        Actor::new("contractor@site.test", Role::Contractor)
    }

    #[test]
    fn test_submission_into_report() {
        let report = ReportSubmission::new("proj-1", "photos/day-12.jpg")
            .with_gps(26.9124, 75.7873)
            .with_worker_count(12)
            .with_material(MaterialEntry::new("Cement", 40.0, "bags"))
            .into_report(&contractor())
            .unwrap();

        assert!(report.id.starts_with("rpt-"));
        assert_eq!(report.project_id, "proj-1");
        assert_eq!(report.submitted_by, "contractor@site.test");
        assert_eq!(report.submitter_role, Role::Contractor);
        assert_eq!(report.worker_count, 12);
        assert_eq!(report.materials[0].key(), "cement");
    }

    #[test]
    fn test_missing_gps_rejected() {
        let err = ReportSubmission::new("proj-1", "p.jpg")
            .with_worker_count(3)
            .into_report(&contractor())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("gps_lat"));
    }

    #[test]
    fn test_negative_worker_count_rejected() {
        let err = ReportSubmission::new("proj-1", "p.jpg")
            .with_gps(1.0, 1.0)
            .with_worker_count(-1)
            .into_report(&contractor())
            .unwrap_err();
        assert!(err.to_string().contains("worker_count"));
    }

    #[test]
    fn test_blank_project_rejected() {
        let err = ReportSubmission::new("  ", "p.jpg")
            .with_gps(1.0, 1.0)
            .with_worker_count(0)
            .into_report(&contractor())
            .unwrap_err();
        assert!(err.to_string().contains("project_id"));
    }

    #[test]
    fn test_nan_gps_rejected() {
        let err = ReportSubmission::new("proj-1", "p.jpg")
            .with_gps(f64::NAN, 75.0)
            .with_worker_count(0)
            .into_report(&contractor())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_blank_transcript_dropped() {
        let report = ReportSubmission::new("proj-1", "p.jpg")
            .with_gps(1.0, 1.0)
            .with_worker_count(0)
            .with_transcript("   ")
            .into_report(&contractor())
            .unwrap();
        assert!(report.voice_transcript.is_none());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Engineer".parse::<Role>().unwrap(), Role::Engineer);
        assert!("admin".parse::<Role>().is_err());
    }
}
