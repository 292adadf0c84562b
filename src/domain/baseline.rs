use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::report::material_key;
use crate::geo::Coordinate;

/// Engineer-authored roadmap a project's submissions are checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBaseline {
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Coordinate>,
    /// Planned total quantity per material, keyed case-insensitively.
    #[serde(default)]
    pub materials: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_workers: Option<u32>,
    #[serde(default)]
    pub milestones: BTreeMap<String, NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl ProjectBaseline {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            site: None,
            materials: BTreeMap::new(),
            planned_workers: None,
            milestones: BTreeMap::new(),
            set_by: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_site(mut self, site: Coordinate) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_material(mut self, name: &str, planned: f64) -> Self {
        self.materials.insert(material_key(name), planned);
        self
    }

    pub fn with_milestone(mut self, name: impl Into<String>, due: NaiveDate) -> Self {
        self.milestones.insert(name.into(), due);
        self
    }

    pub fn with_planned_workers(mut self, workers: u32) -> Self {
        self.planned_workers = Some(workers);
        self
    }

    /// Re-key the material plan so lookups are case-insensitive regardless of
    /// how the plan was authored.
    pub fn normalized(mut self) -> Self {
        let materials = std::mem::take(&mut self.materials);
        for (name, planned) in materials {
            *self.materials.entry(material_key(&name)).or_insert(0.0) += planned;
        }
        self
    }

    pub fn planned_quantity(&self, material: &str) -> Option<f64> {
        let key = material_key(material);
        self.materials
            .iter()
            .find(|(name, _)| material_key(name) == key)
            .map(|(_, planned)| *planned)
    }

    pub fn has_materials(&self) -> bool {
        !self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_quantity_case_insensitive() {
        let baseline = ProjectBaseline::new("proj-1")
            .with_material("Cement", 500.0)
            .with_material("steel", 10.0);

        assert_eq!(baseline.planned_quantity("cement"), Some(500.0));
        assert_eq!(baseline.planned_quantity("CEMENT "), Some(500.0));
        assert_eq!(baseline.planned_quantity("Steel"), Some(10.0));
        assert_eq!(baseline.planned_quantity("sand"), None);
    }

    #[test]
    fn test_normalized_merges_mixed_case_keys() {
        let mut baseline = ProjectBaseline::new("proj-1");
        baseline.materials.insert("Bricks".into(), 20000.0);
        baseline.materials.insert("bricks".into(), 5000.0);

        let baseline = baseline.normalized();
        assert_eq!(baseline.materials.len(), 1);
        assert_eq!(baseline.materials["bricks"], 25000.0);
    }

    #[test]
    fn test_deserialize_minimal() {
        let baseline: ProjectBaseline = serde_json::from_str(
            r#"{"project_id":"proj-2","updated_at":"2024-04-15T00:00:00Z","materials":{"Sand":80}}"#,
        )
        .unwrap();
        assert!(baseline.site.is_none());
        assert_eq!(baseline.planned_quantity("sand"), Some(80.0));
        assert!(baseline.milestones.is_empty());
    }
}
