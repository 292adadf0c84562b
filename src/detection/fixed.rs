//! Deterministic detector stand-ins for tests and model-less deployments.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{DetectorResult, ImageDuplicateDetector, WorkerCountEstimator};
use crate::domain::PhotoRef;
use crate::error::DetectorError;

#[derive(Debug, Default)]
pub struct FixedDuplicateDetector {
    duplicate: bool,
    calls: AtomicUsize,
}

impl FixedDuplicateDetector {
    pub fn new(duplicate: bool) -> Self {
        Self {
            duplicate,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageDuplicateDetector for FixedDuplicateDetector {
    async fn is_duplicate(&self, _photo: &PhotoRef, _project_id: &str) -> DetectorResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.duplicate)
    }
}

/// Always fails, as an unreachable duplicate-detection service would.
#[derive(Debug, Clone)]
pub struct FailingDuplicateDetector {
    reason: String,
}

impl FailingDuplicateDetector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ImageDuplicateDetector for FailingDuplicateDetector {
    async fn is_duplicate(&self, _photo: &PhotoRef, _project_id: &str) -> DetectorResult<bool> {
        Err(DetectorError::unavailable(self.reason.clone()))
    }
}

#[derive(Debug)]
pub struct FixedWorkerCount {
    count: u32,
    calls: AtomicUsize,
}

impl FixedWorkerCount {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerCountEstimator for FixedWorkerCount {
    async fn estimate(&self, _photo: &PhotoRef) -> DetectorResult<u32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.count)
    }
}

/// Used when no vision model is deployed: the labour check is reported as
/// degraded rather than silently passing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableWorkerEstimator;

#[async_trait]
impl WorkerCountEstimator for UnavailableWorkerEstimator {
    async fn estimate(&self, _photo: &PhotoRef) -> DetectorResult<u32> {
        Err(DetectorError::unavailable("no worker-count model configured"))
    }
}

/// Answers only after `delay`; exercises the engine's timeout path.
#[derive(Debug, Clone, Copy)]
pub struct StalledWorkerEstimator {
    delay: Duration,
    count: u32,
}

impl StalledWorkerEstimator {
    pub fn new(delay: Duration, count: u32) -> Self {
        Self { delay, count }
    }
}

#[async_trait]
impl WorkerCountEstimator for StalledWorkerEstimator {
    async fn estimate(&self, _photo: &PhotoRef) -> DetectorResult<u32> {
        tokio::time::sleep(self.delay).await;
        Ok(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_detectors_count_calls() {
        let photo = PhotoRef::new("p.jpg");
        let dup = FixedDuplicateDetector::new(true);
        assert!(dup.is_duplicate(&photo, "proj-1").await.unwrap());
        assert!(dup.is_duplicate(&photo, "proj-1").await.unwrap());
        assert_eq!(dup.call_count(), 2);

        let workers = FixedWorkerCount::new(7);
        assert_eq!(workers.estimate(&photo).await.unwrap(), 7);
        assert_eq!(workers.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_estimator() {
        let err = UnavailableWorkerEstimator
            .estimate(&PhotoRef::new("p.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectorError::Unavailable(_)));
    }
}
