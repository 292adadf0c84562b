use std::collections::BTreeMap;

use async_trait::async_trait;

use super::DetectorResult;
use crate::domain::MaterialEntry;

/// Source of a project's previously logged material consumption.
#[async_trait]
pub trait MaterialHistory: Send + Sync {
    async fn material_history(&self, project_id: &str) -> DetectorResult<Vec<MaterialEntry>>;
}

/// History source for projects whose earlier logs are not tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMaterialHistory;

#[async_trait]
impl MaterialHistory for NoMaterialHistory {
    async fn material_history(&self, _project_id: &str) -> DetectorResult<Vec<MaterialEntry>> {
        Ok(Vec::new())
    }
}

/// Sums historical and newly logged quantities per material.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialUsageEstimator;

impl MaterialUsageEstimator {
    /// Cumulative usage keyed by lowercased material name.
    pub fn cumulative(
        &self,
        history: &[MaterialEntry],
        current: &[MaterialEntry],
    ) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for entry in history.iter().chain(current) {
            if entry.quantity.is_finite() {
                *totals.entry(entry.key()).or_insert(0.0) += entry.quantity;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cumulative_merges_case_insensitive_names() {
        let history = vec![
            MaterialEntry::new("Cement", 300.0, "bags"),
            MaterialEntry::new("steel", 4.0, "tonnes"),
        ];
        let current = vec![
            MaterialEntry::new("CEMENT", 60.0, "bags"),
            MaterialEntry::new("Sand", 5.0, "m3"),
        ];

        let totals = MaterialUsageEstimator.cumulative(&history, &current);
        assert_eq!(totals["cement"], 360.0);
        assert_eq!(totals["steel"], 4.0);
        assert_eq!(totals["sand"], 5.0);
    }

    #[test]
    fn test_cumulative_empty() {
        assert!(MaterialUsageEstimator.cumulative(&[], &[]).is_empty());
    }
}
