//! Daily-report verification.
//!
//! `VerificationEngine` runs four independent checks over a submitted report
//! and aggregates their findings into a verdict:
//! 1. GPS plausibility against the baseline site
//! 2. Duplicate-image detection
//! 3. Reported versus detected labor
//! 4. Cumulative material consumption against the plan

mod checks;
mod engine;
mod pipeline;

pub use checks::{ALL_CHECKS_PASSED, AlertCandidate, Check, Verdict, VerificationResult};
pub use engine::VerificationEngine;
