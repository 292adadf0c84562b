//! Alert event notification.
//!
//! - `AlertEvent`: raised, resolved and reopened alerts
//! - `Notifier`: per-project event log and optional hook command

mod events;
mod notifier;

pub use events::{AlertEvent, EventType};
pub use notifier::Notifier;
