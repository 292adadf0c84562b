//! Command-line interface definitions.
//!
//! Provides CLI structure and output formatting:
//! - `Cli`, `Commands`: CLI argument definitions via clap
//! - `Display`: Formatted terminal output with colors

mod commands;
mod display;

pub use commands::{
    BaselineAction, Cli, Commands, ConfigAction, OutputFormat, ProjectAction, RoleArg,
};
pub use display::Display;
