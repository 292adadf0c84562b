use console::{Style, style};

use crate::domain::{Alert, AlertSeverity, Project, ProjectBaseline};
use crate::service::SubmissionOutcome;
use crate::summary::ProjectSummary;
use crate::utils::truncate_str;
use crate::verification::Verdict;

pub struct Display;

impl Display {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", style(text).bold().cyan());
        println!("{}", style("═".repeat(60)).dim());
        println!();
    }

    pub fn print_submission(&self, outcome: &SubmissionOutcome) {
        let verification = &outcome.verification;
        let verdict_style = match verification.verdict {
            Verdict::Verified => Style::new().green().bold(),
            Verdict::VerifiedWithWarnings => Style::new().yellow().bold(),
            Verdict::Flagged => Style::new().red().bold(),
        };

        println!(
            "{}  {}",
            style(&outcome.report.id).bold(),
            verdict_style.apply_to(verification.verdict.to_string())
        );
        println!("    Project:  {}", outcome.report.project_id);
        println!("    Location: {}", outcome.report.location);
        println!("    Workers:  {}", outcome.report.worker_count);
        println!("    Notes:    {}", verification.notes);

        if !outcome.alerts.is_empty() {
            println!();
            for alert in &outcome.alerts {
                self.print_alert_line(alert);
            }
        }

        for warning in &outcome.warnings {
            self.print_warning(warning);
        }
        println!();
    }

    pub fn print_alerts_table(&self, alerts: &[Alert]) {
        if alerts.is_empty() {
            println!("{}", style("No alerts found.").dim());
            return;
        }

        let open = alerts.iter().filter(|a| a.is_open()).count();
        println!(
            "Open: {}  Resolved: {}",
            style(open).yellow(),
            style(alerts.len() - open).green()
        );
        println!();

        println!(
            "{:<20} {:<14} {:<8} {:<10} {}",
            style("ID").bold(),
            style("Project").bold(),
            style("Severity").bold(),
            style("Status").bold(),
            style("Message").bold()
        );
        println!("{}", style("─".repeat(90)).dim());

        for alert in alerts {
            let status = if alert.resolved {
                style("resolved").dim()
            } else {
                style("open").yellow()
            };
            println!(
                "{:<20} {:<14} {:<8} {:<10} {}",
                alert.id,
                truncate_str(&alert.project_id, 14),
                self.severity_style(alert.severity)
                    .apply_to(alert.severity.as_str()),
                status,
                truncate_str(&alert.message, 60)
            );
        }
    }

    pub fn print_alert_line(&self, alert: &Alert) {
        println!(
            "  {} [{}] {}",
            style("!").yellow().bold(),
            self.severity_style(alert.severity)
                .apply_to(alert.severity.as_str()),
            alert.message
        );
    }

    pub fn print_alert_detail(&self, alert: &Alert) {
        println!("{}  {}", style(&alert.id).bold(), alert.message);
        println!(
            "    Severity: {}",
            self.severity_style(alert.severity)
                .apply_to(alert.severity.as_str())
        );
        match (&alert.resolved_by, alert.resolved_at) {
            (Some(by), Some(at)) if alert.resolved => println!(
                "    Resolved: {} by {}",
                at.format("%Y-%m-%d %H:%M:%S"),
                by
            ),
            _ => println!("    Resolved: {}", style("no").yellow()),
        }
    }

    pub fn print_baseline(&self, baseline: &ProjectBaseline) {
        self.print_header(&format!("Baseline: {}", baseline.project_id));

        if let Some(site) = baseline.site {
            println!("Site:            {}", site);
        }
        if let Some(workers) = baseline.planned_workers {
            println!("Planned workers: {}", workers);
        }
        if let Some(by) = &baseline.set_by {
            println!("Set by:          {}", by);
        }
        println!(
            "{}",
            style(format!(
                "Updated:         {}",
                baseline.updated_at.format("%Y-%m-%d %H:%M:%S")
            ))
            .dim()
        );

        if !baseline.materials.is_empty() {
            println!();
            println!("{}", style("Materials:").bold());
            for (name, planned) in &baseline.materials {
                println!("  {:<20} {}", name, planned);
            }
        }

        if !baseline.milestones.is_empty() {
            println!();
            println!("{}", style("Milestones:").bold());
            for (name, due) in &baseline.milestones {
                println!("  {:<20} {}", name, due);
            }
        }
    }

    pub fn print_project(&self, project: &Project) {
        println!(
            "{}  {} ({}%, {})",
            style(&project.id).bold(),
            project.name,
            project.progress_percent,
            project.status
        );
    }

    pub fn print_summary(&self, summary: &ProjectSummary) {
        println!("{}", summary.summary);
        println!();
        let counts = &summary.counts;
        println!(
            "High: {}  Medium: {}  Low: {}  Info: {}",
            self.severity_style(AlertSeverity::High).apply_to(counts.high),
            self.severity_style(AlertSeverity::Medium)
                .apply_to(counts.medium),
            self.severity_style(AlertSeverity::Low).apply_to(counts.low),
            self.severity_style(AlertSeverity::Info).apply_to(counts.info)
        );
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", style("✓").green().bold(), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", style("!").yellow().bold(), message);
    }

    pub fn print_info(&self, message: &str) {
        println!("{} {}", style("→").cyan(), message);
    }

    fn severity_style(&self, severity: AlertSeverity) -> Style {
        match severity {
            AlertSeverity::High => Style::new().red().bold(),
            AlertSeverity::Medium => Style::new().yellow(),
            AlertSeverity::Low => Style::new().cyan(),
            AlertSeverity::Info => Style::new().dim(),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
