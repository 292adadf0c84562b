use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::de::DeserializeOwned;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use site_sentry::cli::{
    BaselineAction, Cli, Commands, ConfigAction, Display, ProjectAction, RoleArg,
};
use site_sentry::config::{CONFIG_FILE, SentryConfig, StorageConfig};
use site_sentry::detection::{FixedWorkerCount, UnavailableWorkerEstimator, WorkerCountEstimator};
use site_sentry::domain::{Actor, Project, ProjectBaseline, ReportSubmission};
use site_sentry::error::Result;
use site_sentry::notification::Notifier;
use site_sentry::output::OutputWriter;
use site_sentry::service::{Detectors, SiteOfficer, Stores};
use site_sentry::store::FileStore;

/// Context for command output handling.
struct OutputContext<'a> {
    display: &'a Display,
    writer: &'a OutputWriter,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Display::new().print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("site_sentry=debug")
    } else {
        EnvFilter::new("site_sentry=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let display = Display::new();
    let writer = OutputWriter::new(cli.output);
    let out = OutputContext {
        display: &display,
        writer: &writer,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| StorageConfig::default().data_dir);

    match cli.command {
        Commands::Submit {
            report,
            actor,
            role,
            detected_workers,
        } => cmd_submit(&out, &data_dir, &report, actor, role, detected_workers).await,
        Commands::Alerts { project } => cmd_alerts(&out, &data_dir, project.as_deref()).await,
        Commands::Resolve {
            alert_id,
            actor,
            role,
            reopen,
        } => cmd_resolve(&out, &data_dir, &alert_id, actor, role, reopen).await,
        Commands::Baseline { action } => cmd_baseline(&out, &data_dir, action).await,
        Commands::Project { action } => cmd_project(&out, &data_dir, action).await,
        Commands::Summary { project_id } => cmd_summary(&out, &data_dir, &project_id).await,
        Commands::Config { action } => cmd_config(&out, &data_dir, action).await,
    }
}

async fn open_officer(
    data_dir: &Path,
    workers: Arc<dyn WorkerCountEstimator>,
) -> Result<SiteOfficer> {
    let config = SentryConfig::load(data_dir).await?;
    let store = Arc::new(FileStore::open(data_dir).await?);
    let logs_dir = store.paths().logs_dir.clone();
    let notifier = Notifier::new(config.notification.clone(), Some(logs_dir));

    let stores = Stores::from_file_store(store);
    let detectors = Detectors::store_backed(stores.reports.clone(), workers);
    Ok(SiteOfficer::new(config, stores, detectors).with_notifier(notifier))
}

async fn officer(data_dir: &Path) -> Result<SiteOfficer> {
    open_officer(data_dir, Arc::new(UnavailableWorkerEstimator)).await
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

async fn cmd_submit(
    out: &OutputContext<'_>,
    data_dir: &Path,
    report: &Path,
    email: String,
    role: RoleArg,
    detected_workers: Option<u32>,
) -> Result<()> {
    let submission: ReportSubmission = read_json(report).await?;
    let workers: Arc<dyn WorkerCountEstimator> = match detected_workers {
        Some(count) => Arc::new(FixedWorkerCount::new(count)),
        None => Arc::new(UnavailableWorkerEstimator),
    };

    let officer = open_officer(data_dir, workers).await?;
    let actor = Actor::new(email, role.into());
    let outcome = officer.submit_report(&actor, submission).await?;

    if out.writer.is_json() {
        out.writer.emit(&outcome);
    } else {
        out.display.print_submission(&outcome);
    }
    Ok(())
}

async fn cmd_alerts(out: &OutputContext<'_>, data_dir: &Path, project: Option<&str>) -> Result<()> {
    let officer = officer(data_dir).await?;
    let alerts = officer.list_alerts(project).await?;

    if out.writer.is_json() {
        out.writer.emit(&alerts);
    } else {
        out.display.print_alerts_table(&alerts);
    }
    Ok(())
}

async fn cmd_resolve(
    out: &OutputContext<'_>,
    data_dir: &Path,
    alert_id: &str,
    email: String,
    role: RoleArg,
    reopen: bool,
) -> Result<()> {
    let officer = officer(data_dir).await?;
    let actor = Actor::new(email, role.into());
    let alert = officer.resolve_alert(&actor, alert_id, !reopen).await?;

    if out.writer.is_json() {
        out.writer.emit(&alert);
    } else {
        let verb = if reopen { "Reopened" } else { "Resolved" };
        out.display
            .print_success(&format!("{} alert {}", verb, alert.id));
        out.display.print_alert_detail(&alert);
    }
    Ok(())
}

async fn cmd_baseline(out: &OutputContext<'_>, data_dir: &Path, action: BaselineAction) -> Result<()> {
    let officer = officer(data_dir).await?;

    match action {
        BaselineAction::Set {
            project_id,
            file,
            actor,
            role,
        } => {
            let mut baseline: ProjectBaseline = read_json(&file).await?;
            baseline.project_id = project_id;
            let actor = Actor::new(actor, role.into());
            let saved = officer.set_baseline(&actor, baseline).await?;

            if out.writer.is_json() {
                out.writer.emit(&saved);
            } else {
                out.display
                    .print_success(&format!("Baseline set for {}", saved.project_id));
            }
        }
        BaselineAction::Get { project_id } => {
            let baseline = officer.get_baseline(&project_id).await?;
            if out.writer.is_json() {
                out.writer.emit(&baseline);
            } else {
                out.display.print_baseline(&baseline);
            }
        }
    }
    Ok(())
}

async fn cmd_project(out: &OutputContext<'_>, data_dir: &Path, action: ProjectAction) -> Result<()> {
    let officer = officer(data_dir).await?;

    match action {
        ProjectAction::Add { file } => {
            let project: Project = read_json(&file).await?;
            officer.add_project(project.clone()).await?;

            if out.writer.is_json() {
                out.writer.emit(&project);
            } else {
                out.display.print_success("Project saved.");
                out.display.print_project(&project);
            }
        }
    }
    Ok(())
}

async fn cmd_summary(out: &OutputContext<'_>, data_dir: &Path, project_id: &str) -> Result<()> {
    let officer = officer(data_dir).await?;
    let summary = officer.project_summary(project_id).await?;

    if out.writer.is_json() {
        out.writer.emit(&summary);
    } else {
        out.display.print_summary(&summary);
    }
    Ok(())
}

async fn cmd_config(out: &OutputContext<'_>, data_dir: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = SentryConfig::load(data_dir).await?;
            if out.writer.is_json() {
                out.writer.emit(&config);
            } else {
                let yaml = serde_yaml_bw::to_string(&config)?;
                println!("{}", yaml);
            }
        }
        ConfigAction::Init => {
            let config = SentryConfig::default();
            config.save(data_dir).await?;
            let path = data_dir.join(CONFIG_FILE);
            if out.writer.is_json() {
                out.writer
                    .emit_message(&format!("Wrote {}", path.display()));
            } else {
                out.display.print_success("Configuration initialized.");
                out.display
                    .print_info(&format!("Configuration: {}", path.display()));
            }
        }
    }
    Ok(())
}
