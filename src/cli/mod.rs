//! CLI command implementations for cloudcost.
//!
//! Provides subcommand handlers for:
//! - `cloudcost predict <FILE>` / `cloudcost waste <FILE>`: upload and render
//! - `cloudcost web`: local dashboard
//! - `cloudcost history`: recent analyses from the history log
//! - `cloudcost config show|init|set|reset`: configuration management

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use colored::{ColoredString, Colorize};

use crate::api::ApiClient;
use crate::config::{self, schema::CloudCostConfig};
use crate::controller::{ActionKind, AnalysisResult, Controller, SelectedFile};
use crate::export;
use crate::history::{self, HistoryEntry, HistoryLog};
use crate::render::{self, Meter, ResultHeader, ResultView, SummaryCard, Tone};
use crate::render::prediction::PredictionView;
use crate::render::waste::WasteView;
use crate::web;

/// Output format for result and history commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Apply the `[display]` section to terminal output.
fn apply_display(cfg: &CloudCostConfig) {
    if !cfg.display.color {
        colored::control::set_override(false);
    }
}

// ---------------------------------------------------------------------------
// cloudcost predict | waste
// ---------------------------------------------------------------------------

/// Options shared by `predict` and `waste`.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub download: bool,
    pub copy: bool,
}

/// Upload `path` to the service and print the rendered result.
///
/// Returns a failing exit code when the analysis did not produce a result;
/// the error panel has already been printed by then.
pub fn run_analyze(
    kind: ActionKind,
    path: &Path,
    format: OutputFormat,
    options: AnalyzeOptions,
) -> Result<ExitCode> {
    let cfg = config::load();
    apply_display(&cfg);

    let file = SelectedFile::open(path)?;

    let mut controller = Controller::new(ApiClient::from_config(&cfg.api));
    if let Some(log) = HistoryLog::from_config(&cfg.logging) {
        controller = controller.with_history(log);
    }
    controller.select_file(Some(file));

    if format == OutputFormat::Table {
        eprintln!("{}", "Analyzing your cloud data".bold());
        eprintln!(
            "  {}",
            "This may take a moment while we process your file...".dimmed()
        );
    }

    let result = match controller.run_action(kind) {
        Ok(result) => result,
        Err(err) => {
            let message = err.user_message();
            match format {
                OutputFormat::Json => {
                    let value = serde_json::json!({ "error": message });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Table => print_error_panel(&message),
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    match format {
        OutputFormat::Json => println!("{}", result.to_pretty_json()?),
        OutputFormat::Table => print_view(&render::render(&result), cfg.display.bar_width),
    }

    if options.download {
        let dir = export_dir(&cfg);
        let written = export::download_report(&result, &dir, export::report_date())?;
        eprintln!("{} Report saved to {}", "✓".green().bold(), written.display());
    }
    if options.copy {
        copy_result(&result);
    }

    Ok(ExitCode::SUCCESS)
}

fn export_dir(cfg: &CloudCostConfig) -> PathBuf {
    cfg.export.dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn copy_result(result: &AnalysisResult) {
    if export::copy_to_clipboard(result) {
        eprintln!("{} {}", "✓".green().bold(), export::CLIPBOARD_SUCCESS);
    }
}

fn print_error_panel(message: &str) {
    eprintln!();
    eprintln!("{} {}", "⚠".red().bold(), "Error".red().bold());
    eprintln!("  {}", message.red());
}

// ---------------------------------------------------------------------------
// Result views
// ---------------------------------------------------------------------------

fn print_view(view: &ResultView, bar_width: usize) {
    match view {
        ResultView::Prediction(v) => print_prediction(v, bar_width),
        ResultView::Waste(v) => print_waste(v, bar_width),
    }
}

fn print_header(header: &ResultHeader) {
    println!();
    println!("{}  {}", header.title.bold().cyan(), header.badge.dimmed());
    println!(
        "{}",
        format!("Analysis completed at {}", header.completed_at).dimmed()
    );
    println!("{}", "=".repeat(60));
}

fn print_summary(cards: &[SummaryCard]) {
    for card in cards {
        println!(
            "  {:<28} {:>12}  {}",
            card.title.bold(),
            tone(card.tone, &card.value).bold(),
            card.subtitle.dimmed(),
        );
    }
    println!();
}

fn print_prediction(view: &PredictionView, bar_width: usize) {
    print_header(&view.header);
    print_summary(&view.summary);

    println!("{}", "📊 Cost Predictions (Next 7 Days)".bold().cyan());
    println!(
        "  {:<8} {:<5} {:>10}  {:<w$}  {:<w$}",
        "Date",
        "Day",
        "Cost",
        "CPU",
        "Memory",
        w = bar_width + 8,
    );
    println!("  {}", "-".repeat(28 + 2 * (bar_width + 10)));
    for (i, row) in view.forecast.iter().enumerate() {
        let line = format!(
            "  {:<8} {:<5} {:>10}  {}  {}",
            row.date,
            row.day,
            row.cost,
            meter(&row.cpu, bar_width),
            meter(&row.memory, bar_width),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!(
        "  {} {} {}",
        trend_color(&view.trend.trend, &view.trend.label).bold(),
        view.trend.confidence,
        "confidence".dimmed()
    );
    println!();

    println!("{}", "⚡ Performance Predictions".bold().cyan());
    let perf = &view.performance;
    println!("  {:<16} {}", "Peak CPU".bold(), meter(&perf.peak_cpu, bar_width));
    println!(
        "  {:<16} {}",
        "Peak Memory".bold(),
        meter(&perf.peak_memory, bar_width)
    );
    println!("  {:<16} {}", "Bottleneck Risk".bold(), risk_color(&perf.risk));
    println!("  {}", perf.peak_time.dimmed());
    println!();

    println!("{}", "🎯 Optimization Opportunities".bold().cyan());
    if let Some(ref note) = view.empty_note {
        println!("  {}", note.dimmed());
    }
    for opp in &view.opportunities {
        let label = match opp.icon {
            Some(ref icon) => format!("{icon} {}", opp.label),
            None => opp.label.clone(),
        };
        println!(
            "  {:<24} {:>10}  {}",
            label,
            opp.savings.green(),
            meter(&opp.confidence, bar_width),
        );
    }
}

fn print_waste(view: &WasteView, bar_width: usize) {
    print_header(&view.header);
    print_summary(&view.summary);

    println!("{}", "⏰ Idle Periods Detected".bold().cyan());
    println!("  {}", view.idle.subtitle.dimmed());
    if !view.idle.rows.is_empty() {
        println!(
            "  {:<38} {:>8}  {:<w$}  {:<w$}  {:>11}",
            "Period",
            "Duration",
            "Avg CPU",
            "Avg Memory",
            "Wasted Cost",
            w = bar_width + 8,
        );
        println!("  {}", "-".repeat(62 + 2 * (bar_width + 10)));
    }
    for (i, row) in view.idle.rows.iter().enumerate() {
        let line = format!(
            "  {:<38} {:>8}  {}  {}  {:>11}",
            format!("{} → {}", row.start, row.end),
            row.duration,
            meter(&row.cpu, bar_width),
            meter(&row.memory, bar_width),
            row.wasted_cost,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    if let Some(ref overflow) = view.idle.overflow {
        println!("  {}", overflow.dimmed());
    }
    println!();

    println!("{}", "📊 Waste Analysis".bold().cyan());
    println!(
        "  {:<26} {}",
        "Underutilization Score".bold(),
        meter(&view.analysis.score, bar_width)
    );
    println!(
        "  {:<26} {}",
        "Total Waste Percentage".bold(),
        view.analysis.waste_percentage.yellow()
    );
    println!();

    println!("{}", "🚀 Optimization Recommendations".bold().cyan());
    for rec in &view.recommendations {
        println!("  {} {}", rec.icon, rec.text);
    }
}

/// `████░░░░░░ 40.0%`
fn meter(m: &Meter, width: usize) -> String {
    format!("{} {:>7}", bar(m.fill, width), m.label)
}

/// Horizontal bar of `width` cells, `fill` percent of them solid.
fn bar(fill: f64, width: usize) -> String {
    let solid = ((fill.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let solid = solid.min(width);
    format!("{}{}", "█".repeat(solid), "░".repeat(width - solid))
}

fn tone(tone: Tone, text: &str) -> ColoredString {
    match tone {
        Tone::Blue => text.blue(),
        Tone::Green => text.green(),
        Tone::Purple => text.magenta(),
        Tone::Orange => text.yellow(),
        Tone::Red => text.red(),
    }
}

fn trend_color(trend: &str, text: &str) -> ColoredString {
    match trend {
        "rising" | "increasing" => text.red(),
        "falling" | "decreasing" => text.green(),
        _ => text.normal(),
    }
}

fn risk_color(risk: &str) -> ColoredString {
    match risk {
        "high" => risk.red(),
        "low" => risk.green(),
        _ => risk.yellow(),
    }
}

// ---------------------------------------------------------------------------
// cloudcost web
// ---------------------------------------------------------------------------

/// Start the local dashboard. `addr` overrides `[web] addr`.
pub fn run_web(addr: Option<&str>) -> Result<()> {
    let cfg = config::load();
    apply_display(&cfg);
    web::serve(&cfg, addr.unwrap_or(&cfg.web.addr))
}

// ---------------------------------------------------------------------------
// cloudcost history
// ---------------------------------------------------------------------------

/// Show the most recent analyses, newest first.
pub fn run_history(limit: usize, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    apply_display(&cfg);

    let Some(path) = cfg
        .logging
        .history_file
        .clone()
        .or_else(history::default_history_path)
    else {
        println!("{}", "No home directory; history is unavailable.".yellow());
        return Ok(());
    };
    let log = HistoryLog::new(path);
    let entries = log.recent(limit);

    if entries.is_empty() {
        println!(
            "{}",
            format!(
                "No history yet in {}. Run `cloudcost predict <FILE>` to get started.",
                log.path().display()
            )
            .yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Table => print_history_table(&entries),
    }

    Ok(())
}

fn print_history_table(entries: &[HistoryEntry]) {
    println!("{}", "Recent Analyses".bold().cyan());
    println!("{}", "=".repeat(72));
    println!(
        "  {:<20} {:<8} {:<24} {:>9}  Status",
        "Time", "Action", "File", "Latency"
    );
    println!("  {}", "-".repeat(70));

    for (i, entry) in entries.iter().enumerate() {
        let status = match entry.error {
            None => "ok".to_string(),
            Some(ref e) => truncate(e, 30),
        };
        let line = format!(
            "  {:<20} {:<8} {:<24} {:>7}ms  {}",
            history_time(&entry.timestamp),
            entry.action,
            truncate(&entry.file, 24),
            entry.latency_ms,
            status,
        );
        if !entry.success {
            println!("{}", line.red());
        } else if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

/// Local `YYYY-MM-DD HH:MM:SS` for an RFC 3339 log timestamp.
fn history_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| truncate(timestamp, 20))
}

// ---------------------------------------------------------------------------
// cloudcost config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective cloudcost Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.cloudcost/config.toml", global_exists);
    print_source(".cloudcost.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "CLOUDCOST_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.cloudcost/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to point cloudcost at another service.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str_opt(Some("csv")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_bar_width_and_clamping() {
        assert_eq!(bar(0.0, 10), "░░░░░░░░░░");
        assert_eq!(bar(40.0, 10), "████░░░░░░");
        assert_eq!(bar(100.0, 10), "██████████");
        assert_eq!(bar(250.0, 4), "████");
        assert_eq!(bar(-3.0, 4), "░░░░");
        assert_eq!(bar(50.0, 0), "");
    }

    #[test]
    fn test_meter_line() {
        let m = Meter {
            fill: 75.0,
            label: "75.0%".to_string(),
        };
        assert_eq!(meter(&m, 4), "███░   75.0%");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("überlang", 3), "üb…");
    }

    #[test]
    fn test_history_time_falls_back_to_raw() {
        assert_eq!(history_time("not a time"), "not a time");
        assert_eq!(history_time("2024-01-15T10:00:00+00:00").len(), 19);
    }
}
