//! CLI for the bulkdl bulk media downloader.

mod commands;
mod linklist;

use anyhow::Result;
use bulkdl_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_batch, run_list};

/// Top-level CLI for the bulkdl downloader.
#[derive(Debug, Parser)]
#[command(name = "bulkdl")]
#[command(about = "bulkdl: bulk media downloads with bounded concurrency", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Extract download links from a CSV/text file and run the batch.
    Run {
        /// File containing http(s) links (CSV or plain text).
        file: PathBuf,

        /// Directory to save downloads into (created if missing).
        #[arg(long)]
        target: PathBuf,

        /// Which extension to download.
        #[arg(long, default_value = "mkv")]
        ext: String,

        /// Max concurrent transfers (defaults to the config value).
        #[arg(short = 'j', long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show what a run would do, without starting any transfer.
    List {
        /// File containing http(s) links (CSV or plain text).
        file: PathBuf,

        /// Directory downloads would be saved into.
        #[arg(long)]
        target: PathBuf,

        /// Which extension to consider.
        #[arg(long, default_value = "mkv")]
        ext: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                file,
                target,
                ext,
                jobs,
            } => run_batch(&cfg, &file, &target, &ext, jobs).await?,
            CliCommand::List { file, target, ext } => run_list(&file, &target, &ext)?,
        }

        Ok(())
    }
}
