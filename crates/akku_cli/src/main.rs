//! `akku` command line.
//!
//! # Responsibility
//! - Map subcommands onto `akku_core` operations.
//! - Own process-level setup: logging target and exit status.

use anyhow::Result;
use clap::Parser;
use log::info;

mod commands;

#[derive(Parser)]
#[command(name = "akku", version, about = "Aggregate personal journal entries")]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "AKKU_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; logs go to stderr otherwise
    #[arg(long, global = true, env = "AKKU_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let initialized = match &cli.log_dir {
        Some(dir) => {
            let level = cli
                .log_level
                .as_deref()
                .unwrap_or_else(|| akku_core::default_log_level());
            akku_core::init_logging(level, dir)
        }
        None => akku_core::init_stderr_logging(cli.log_level.as_deref().unwrap_or("warn")),
    };
    initialized.map_err(anyhow::Error::msg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        akku_core::core_version()
    );

    match &cli.command {
        commands::Commands::AddSource(args) => commands::source::add(args),
        commands::Commands::Sources(args) => commands::source::list(args),
        commands::Commands::RemoveSource(args) => commands::source::remove(args),
        commands::Commands::Refresh(args) => commands::refresh::run(args),
        commands::Commands::Stats(args) => commands::stats::run(args),
        commands::Commands::Show(args) => commands::show::run(args),
    }
}
