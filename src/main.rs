use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cloudcost::cli::{self, AnalyzeOptions, OutputFormat};
use cloudcost::controller::ActionKind;

#[derive(Debug, Parser)]
#[command(name = "cloudcost")]
#[command(about = "Cloud cost prediction and waste detection client")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Predict next week's cost from a usage CSV
    Predict {
        #[command(flatten)]
        analyze: AnalyzeArgs,
    },
    /// Detect idle periods and wasted spend in a usage CSV
    Waste {
        #[command(flatten)]
        analyze: AnalyzeArgs,
    },
    /// Serve the local web dashboard
    Web {
        /// Listen address (default: [web] addr, 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Show recent analyses from the history log
    History {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Args)]
struct AnalyzeArgs {
    /// Path to a .csv file
    file: PathBuf,
    /// Output format: table (default), json
    #[arg(long, default_value = "table")]
    format: String,
    /// Save the result as cloud-cost-report-<date>.json
    #[arg(long)]
    download: bool,
    /// Copy the result JSON to the clipboard
    #[arg(long)]
    copy: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective merged configuration
    Show,
    /// Write a default ~/.cloudcost/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.base_url`
    Set { key: String, value: String },
    /// Restore the default configuration
    Reset,
}

fn analyze(kind: ActionKind, args: AnalyzeArgs) -> Result<ExitCode> {
    let fmt = OutputFormat::from_str_opt(Some(&args.format));
    let options = AnalyzeOptions {
        download: args.download,
        copy: args.copy,
    };
    cli::run_analyze(kind, &args.file, fmt, options)
}

fn main() -> Result<ExitCode> {
    let app = App::parse();

    match app.command {
        Commands::Predict { analyze: args } => analyze(ActionKind::Predict, args),
        Commands::Waste { analyze: args } => analyze(ActionKind::Waste, args),
        Commands::Web { addr } => cli::run_web(addr.as_deref()).map(|()| ExitCode::SUCCESS),
        Commands::History { limit, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_history(limit, fmt).map(|()| ExitCode::SUCCESS)
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => cli::run_config_show(),
                ConfigAction::Init { force } => cli::run_config_init(force),
                ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
                ConfigAction::Reset => cli::run_config_reset(),
            }
            .map(|()| ExitCode::SUCCESS)
        }
    }
}
