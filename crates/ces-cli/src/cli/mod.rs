//! CLI for CES: operator actions around the script cache.

mod commands;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ces_core::config;
use std::path::PathBuf;

use commands::{
    run_completions, run_man, run_refresh, run_rewrite, run_status, run_trigger,
};
use context::Context;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ces")]
#[command(about = "CES: mirror remote scripts locally and rewrite pages to use them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every registered script now and update changed cache files.
    Refresh,

    /// Show cache state of every registered script and the last refresh.
    Status,

    /// Rewrite an HTML document (file or stdin) to use cached scripts; writes to stdout.
    Rewrite {
        /// HTML file to read; stdin when omitted.
        path: Option<PathBuf>,
        /// Print the per-rule rewrite outcomes to stderr.
        #[arg(long)]
        debug: bool,
    },

    /// Keep running and refresh periodically until Ctrl-C.
    Run {
        /// Override the configured refresh interval (seconds).
        #[arg(long, value_name = "SECS")]
        interval_secs: Option<u64>,
    },

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff).
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let ctx = Context::from_config(cfg)?;

        match cli.command {
            CliCommand::Refresh => run_refresh(&ctx).await?,
            CliCommand::Status => run_status(&ctx)?,
            CliCommand::Rewrite { path, debug } => run_rewrite(&ctx, path.as_deref(), debug)?,
            CliCommand::Run { interval_secs } => run_trigger(&ctx, interval_secs).await?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
