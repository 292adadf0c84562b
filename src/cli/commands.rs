use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::Role;

#[derive(Parser)]
#[command(name = "site-sentry")]
#[command(author, version, about = "Verification officer for construction site reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Data directory (default: .site-sentry)
    #[arg(long, global = true, env = "SITE_SENTRY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Output format for CLI results.
/// - Text: Human-readable text output (default)
/// - Json: Single JSON object per command
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify and store a daily progress report
    Submit {
        /// Path to the report submission (JSON)
        report: PathBuf,

        /// Submitter email
        #[arg(long = "as", value_name = "EMAIL")]
        actor: String,

        /// Submitter role
        #[arg(long, value_enum, default_value = "contractor")]
        role: RoleArg,

        /// Worker count seen in the photo; the labor check is degraded without it
        #[arg(long)]
        detected_workers: Option<u32>,
    },

    /// List alerts, newest first
    Alerts {
        /// Only alerts for this project
        #[arg(long)]
        project: Option<String>,
    },

    /// Mark an alert resolved
    Resolve {
        /// Alert ID
        alert_id: String,

        /// Resolver email
        #[arg(long = "as", value_name = "EMAIL")]
        actor: String,

        /// Resolver role
        #[arg(long, value_enum, default_value = "owner")]
        role: RoleArg,

        /// Mark the alert unresolved again
        #[arg(long)]
        reopen: bool,
    },

    /// Manage project baselines
    Baseline {
        #[command(subcommand)]
        action: BaselineAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Status summary for a project
    Summary {
        /// Project ID
        project_id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum BaselineAction {
    /// Replace a project's baseline
    Set {
        /// Project ID
        project_id: String,

        /// Path to the baseline (JSON)
        file: PathBuf,

        /// Author email
        #[arg(long = "as", value_name = "EMAIL")]
        actor: String,

        /// Author role
        #[arg(long, value_enum, default_value = "engineer")]
        role: RoleArg,
    },
    /// Show a project's baseline
    Get {
        /// Project ID
        project_id: String,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Register or update a project
    Add {
        /// Path to the project (JSON)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write the default configuration
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Owner,
    Engineer,
    Contractor,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Owner => Self::Owner,
            RoleArg::Engineer => Self::Engineer,
            RoleArg::Contractor => Self::Contractor,
        }
    }
}
