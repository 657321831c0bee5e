use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::Level;
use wkp_client::{CompanyResult, SearchBackend, Stats, StatsSource};
use wkp_core::ConsoleState;
use wkp_core::render::{self, CardLine};

const DEFAULT_LOG_FILE: &str = "wkp.log";

/// Text to print and the exit code a one-shot command finished with.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

pub fn print_banner() {
    println!(
        "{} {}",
        "🧠 Web Knowledge Platform".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!(
        "{}",
        "AI-powered web intelligence for Indian businesses".bright_black()
    );
    println!();
}

// Logging

/// Where tracing output goes. The terminal console owns the screen, so it
/// logs to a file; one-shot commands log to stderr.
#[derive(Debug, Clone, PartialEq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Expands `~` in a user-supplied log path, or falls back to `wkp.log` in
/// the system temp directory.
pub fn log_file_path(raw: Option<&str>) -> PathBuf {
    match raw {
        Some(raw) if !raw.trim().is_empty() => {
            PathBuf::from(shellexpand::tilde(raw.trim()).as_ref())
        }
        _ => std::env::temp_dir().join(DEFAULT_LOG_FILE),
    }
}

/// Opens a log file for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

pub fn init_logging(target: &LogTarget, verbose: bool) -> Result<()> {
    let installed = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    };
    installed.map_err(|e| anyhow!("Failed to install logger: {}", e))
}

// Query

/// Joins the words given on the command line. `None` when there is nothing
/// but whitespace.
pub fn query_text(words: &[String]) -> Option<String> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn format_results_report(results: &[CompanyResult]) -> String {
    let mut report = String::new();
    report.push_str(&format!(
        "{}\n",
        render::results_heading(results.len()).bright_white().bold()
    ));
    report.push_str(&format!("{}\n", "━".repeat(52).bright_blue()));

    for (idx, result) in results.iter().enumerate() {
        if idx > 0 {
            report.push_str(&format!("{}\n", "─".repeat(52).bright_black()));
        }

        for line in render::card_lines(result) {
            let text = match line {
                CardLine::Title(name) => format!("{}", name.bright_blue().bold()),
                CardLine::Domain(domain) => format!("{}", domain.bright_black()),
                CardLine::Badges { confidence, pages } => format!(
                    "{}  {}",
                    format!("Confidence: {}", confidence).cyan(),
                    pages.white()
                ),
                CardLine::ContactHeading => format!("  {}", "Contact Information:".bold()),
                CardLine::EmailHeading => format!("    {}", "Email:".bright_black()),
                CardLine::Email { address, href } => format!(
                    "      {} {}",
                    address.cyan().underline(),
                    format!("<{}>", href).bright_black()
                ),
                CardLine::PhoneHeading => format!("    {}", "Phone:".bright_black()),
                CardLine::Phone(phone) => format!("      {}", phone.green()),
            };
            report.push_str(&text);
            report.push('\n');
        }
    }

    report
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

/// Runs one search and renders the outcome the same way the console
/// would: result cards, or the user-facing message.
pub async fn run_query<B: SearchBackend>(
    backend: &B,
    text: &str,
    as_json: bool,
    show_progress: bool,
) -> CommandOutput {
    let mut state = ConsoleState::new();

    let progress = show_progress.then(|| spinner("Searching..."));
    let outcome = state.submit_query(backend, text).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let Some(outcome) = outcome else {
        return CommandOutput {
            text: format!("{} Nothing to search for.", "→".blue()),
            exit_code: 0,
        };
    };
    let exit_code = if outcome.is_failure() { 1 } else { 0 };

    let text = if as_json {
        let body = json!({
            "query": text,
            "results": state.results(),
            "message": state.message(),
        });
        serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
    } else if let Some(message) = state.message() {
        format!("{} {}", "⚠".yellow().bold(), message.yellow())
    } else {
        format_results_report(state.results())
    };

    CommandOutput { text, exit_code }
}

// Stats

pub fn format_stats_report(stats: &Stats) -> String {
    let mut report = String::new();
    let row = |label: &str, value: String| format!("  {:<18} {}\n", label, value.bright_white().bold());

    report.push_str(&row("Websites Crawled:", stats.urls_crawled.to_string()));
    report.push_str(&row("Entities Found:", stats.entities_in_graph.to_string()));
    if let Some(domains) = stats.domains_processed {
        report.push_str(&row("Domains:", domains.to_string()));
    }
    if let Some(relationships) = stats.relationships_in_graph {
        report.push_str(&row("Relationships:", relationships.to_string()));
    }
    report.push_str(&row(
        "Status:",
        stats.status.clone().unwrap_or_else(|| "active".to_string()),
    ));
    if let Some(ref last_updated) = stats.last_updated {
        report.push_str(&row("Last Updated:", render::format_backend_timestamp(last_updated)));
    }

    report
}

pub async fn run_stats<S: StatsSource>(source: &S, as_json: bool) -> CommandOutput {
    let mut state = ConsoleState::new();

    if !state.refresh_stats(source).await {
        return CommandOutput {
            text: format!("{} Stats not yet available", "✗".red().bold()),
            exit_code: 1,
        };
    }

    let text = if as_json {
        serde_json::to_string_pretty(state.stats()).unwrap_or_default()
    } else {
        format_stats_report(state.stats())
    };

    CommandOutput { text, exit_code: 0 }
}
