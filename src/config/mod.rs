//! Configuration types and loading.
//!
//! - `SentryConfig`: top-level configuration with validation
//! - `VerificationConfig`: pipeline thresholds and detector timeout
//! - `DataPaths`: on-disk layout of the file store

mod settings;

pub use settings::{
    CONFIG_FILE, DataPaths, NotificationConfig, SentryConfig, StorageConfig, SummaryConfig,
    VerificationConfig,
};
