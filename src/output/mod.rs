//! Machine-readable command output.
//!
//! - `OutputWriter`: text messages or one JSON object per command

mod writer;

pub use writer::OutputWriter;
