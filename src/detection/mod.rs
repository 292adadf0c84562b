//! Detector ports consulted by the verification engine.
//!
//! Each port abstracts a check that may be backed by an ML model or an
//! external service. The engine treats every answer as advisory and every
//! failure as "signal unavailable".
//!
//! - `ImageDuplicateDetector`: has this photo been submitted before?
//! - `WorkerCountEstimator`: how many people are visible in the photo?
//! - `MaterialHistory` + `MaterialUsageEstimator`: cumulative consumption

mod fixed;
mod history;
mod material;

use async_trait::async_trait;

pub use fixed::{
    FailingDuplicateDetector, FixedDuplicateDetector, FixedWorkerCount, StalledWorkerEstimator,
    UnavailableWorkerEstimator,
};
pub use history::{PhotoHistoryDetector, StoredMaterialHistory};
pub use material::{MaterialHistory, MaterialUsageEstimator, NoMaterialHistory};

use crate::domain::PhotoRef;
use crate::error::DetectorError;

pub type DetectorResult<T> = std::result::Result<T, DetectorError>;

/// Decides whether a photo repeats one already stored for the project.
///
/// Implementations must be idempotent for the same photo content.
#[async_trait]
pub trait ImageDuplicateDetector: Send + Sync {
    async fn is_duplicate(&self, photo: &PhotoRef, project_id: &str) -> DetectorResult<bool>;
}

/// Estimates the number of people visible in a photo. No accuracy contract.
#[async_trait]
pub trait WorkerCountEstimator: Send + Sync {
    async fn estimate(&self, photo: &PhotoRef) -> DetectorResult<u32>;
}
