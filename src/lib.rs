pub mod cli;
pub mod config;
pub mod detection;
pub mod domain;
pub mod error;
pub mod geo;
pub mod notification;
pub mod output;
pub mod service;
pub mod store;
pub mod summary;
pub mod utils;
pub mod verification;

pub use config::SentryConfig;
pub use domain::{Actor, Alert, AlertSeverity, Project, ProjectBaseline, Report, ReportSubmission, Role};
pub use error::{DetectorError, Result, SentryError};
pub use geo::{Coordinate, distance_meters};
pub use service::{Detectors, SiteOfficer, Stores, SubmissionOutcome};
pub use summary::{ProjectSummary, SeverityCounts, build_summary};
pub use verification::{Verdict, VerificationEngine, VerificationResult};
