//! # lootdata - Encounter Journal Static Data Compiler
//!
//! The main binary for lootdata.
//!
//! This application provides:
//! - CLI interface for both output targets
//! - Table fetching over HTTP or from a local CSV directory
//! - The change-detection gate for the literal static data file
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/lootdata (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐     │
//! │  │   CLI       │    │   Config    │    │  Table Fetcher   │     │
//! │  │  (clap)     │    │   (toml)    │    │  (reqwest / fs)  │     │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘     │
//! │         │                  │                    │               │
//! │         └──────────────────┼────────────────────┘               │
//! │                            ▼                                    │
//! │                    ┌───────────────┐                            │
//! │                    │ lootdata-core │                            │
//! │                    │  (THE LOGIC)  │                            │
//! │                    └───────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Regenerate Data/StaticData.lua if the tables changed
//! lootdata static
//!
//! # CI freshness check (exit 1 when stale)
//! lootdata static --check
//!
//! # Regenerate Data/Compressed.lua from a local CSV dump
//! lootdata -s fixtures/db2 loot
//! ```

use clap::Parser;
use lootdata::cli;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing - LOOTDATA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LOOTDATA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = cli.default_log_filter();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    match cli::execute(cli).await {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the lootdata startup banner.
fn print_banner() {
    println!(
        r#"
  lootdata v{}

  Encounter journal -> client static data
"#,
        env!("CARGO_PKG_VERSION")
    );
}
