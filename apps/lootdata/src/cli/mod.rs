//! # lootdata CLI Module
//!
//! This module implements the CLI interface for lootdata.
//!
//! ## Available Commands
//!
//! - `static` - Regenerate the literal `ns.StaticData` file behind the hash gate
//! - `loot` - Regenerate the compressed `ns.CompressedData` file
//! - `hash` - Print the content hash of a target's fetched tables

mod commands;

use crate::config::{Config, SOURCE_ENV};
use clap::{Parser, Subcommand, ValueEnum};
use lootdata_core::{CompileError, RunMode, Target};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// lootdata - encounter journal static data compiler
///
/// Fetches journal tables and compiles them into the client's Lua data files.
#[derive(Parser, Debug)]
#[command(name = "lootdata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./lootdata.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Table source: a base URL, or a directory of {Table}.csv files
    #[arg(short, long, global = true)]
    pub source: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Filter used when `RUST_LOG` is unset. Only the binary emits events.
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "lootdata=debug"
        } else {
            "lootdata=info"
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate the literal static data file if the tables changed
    Static {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Regenerate even if the stored hash matches
        #[arg(long, conflicts_with = "check")]
        force: bool,

        /// Only report freshness; exit 1 when stale
        #[arg(long)]
        check: bool,
    },

    /// Regenerate the compressed loot data file
    Loot {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the BLAKE3 content hash of the fetched tables
    Hash {
        /// Which target's table set to hash
        #[arg(short = 't', long, value_enum, default_value = "static")]
        target: TargetArg,
    },
}

/// Output target selector.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    Static,
    Loot,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Static => Target::Static,
            TargetArg::Loot => Target::Loot,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<RunStatus, CompileError> {
    let config = Config::load(cli.config.as_deref())?;
    let source_override = cli.source.or_else(|| std::env::var(SOURCE_ENV).ok());
    let ctx = Context::new(config, source_override.as_deref(), cli.json_mode)?;

    match cli.command {
        Commands::Static {
            output,
            force,
            check,
        } => {
            let mode = if force {
                RunMode::Force
            } else if check {
                RunMode::CheckOnly
            } else {
                RunMode::Default
            };
            cmd_static(&ctx, output, mode).await
        }
        Commands::Loot { output } => cmd_loot(&ctx, output).await,
        Commands::Hash { target } => cmd_hash(&ctx, target.into()).await,
    }
}

// =============================================================================
// TESTS
// =============================================================================
