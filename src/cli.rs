use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;
use crate::error::Result;

/// Unveil CLI - Find and reveal hidden page elements
#[derive(Parser)]
#[command(name = "unveil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a page capture for hidden elements
    Scan {
        /// Page capture file (JSON)
        page: PathBuf,
    },

    /// Reveal hidden elements, optionally restoring them afterwards
    Reveal {
        /// Page capture file (JSON)
        page: PathBuf,

        /// Element id to reveal (from 'scan')
        #[arg(long, conflicts_with = "all")]
        id: Option<String>,

        /// Reveal every discovered element
        #[arg(long)]
        all: bool,

        /// Restore the original presentation after revealing
        #[arg(long)]
        restore: bool,

        /// Write the mutated page capture to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show details for one discovered element
    Inspect {
        /// Page capture file (JSON)
        page: PathBuf,

        /// Element id (from 'scan')
        #[arg(long)]
        id: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Scan { page } => commands::scan::run(self, page).await,
            Commands::Reveal {
                page,
                id,
                all,
                restore,
                out,
            } => {
                commands::reveal::run(self, page, id.as_deref(), *all, *restore, out.as_deref())
                    .await
            }
            Commands::Inspect { page, id } => commands::inspect::run(self, page, id).await,
            Commands::Config { command } => commands::config::run(self, command).await,
        }
    }
}
