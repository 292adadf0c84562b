//! Core domain types.
//!
//! Plain serde records shared by the engine, the stores and the CLI:
//! - `Report`: one validated daily-progress submission
//! - `ProjectBaseline`: engineer-authored roadmap
//! - `Alert`: a flagged anomaly with resolution state
//! - `Project`: directory entry used for summaries

mod alert;
mod baseline;
mod project;
mod report;

pub use alert::{Alert, AlertSeverity, sort_newest_first};
pub use baseline::ProjectBaseline;
pub use project::{Project, ProjectStatus};
pub use report::{
    Actor, MaterialEntry, PhotoRef, Report, ReportSubmission, Role, material_key,
};
