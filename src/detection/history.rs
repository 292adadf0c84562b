//! Detectors answered from the report store rather than from pixels.

use std::sync::Arc;

use async_trait::async_trait;

use super::{DetectorResult, ImageDuplicateDetector, MaterialHistory};
use crate::domain::{MaterialEntry, PhotoRef};
use crate::error::DetectorError;
use crate::store::ReportStore;

/// Flags a photo whose content reference was already submitted for the
/// project. Content-addressed references make this idempotent.
pub struct PhotoHistoryDetector {
    reports: Arc<dyn ReportStore>,
}

impl PhotoHistoryDetector {
    pub fn new(reports: Arc<dyn ReportStore>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl ImageDuplicateDetector for PhotoHistoryDetector {
    async fn is_duplicate(&self, photo: &PhotoRef, project_id: &str) -> DetectorResult<bool> {
        let records = self
            .reports
            .list_reports(project_id)
            .await
            .map_err(|e| DetectorError::unavailable(e.to_string()))?;
        Ok(records.iter().any(|r| &r.report.photo == photo))
    }
}

/// Material logs of every stored report for the project.
pub struct StoredMaterialHistory {
    reports: Arc<dyn ReportStore>,
}

impl StoredMaterialHistory {
    pub fn new(reports: Arc<dyn ReportStore>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl MaterialHistory for StoredMaterialHistory {
    async fn material_history(&self, project_id: &str) -> DetectorResult<Vec<MaterialEntry>> {
        let records = self
            .reports
            .list_reports(project_id)
            .await
            .map_err(|e| DetectorError::unavailable(e.to_string()))?;
        Ok(records
            .into_iter()
            .flat_map(|r| r.report.materials)
            .collect())
    }
}
