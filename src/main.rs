//! Aisle Catalog - Binary Entry Point
//!
//! Reads catalog commands from a file (or stdin), runs them and prints the
//! accumulated total rounded to two decimals.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aisle_catalog::{Catalog, CatalogConfig, CommandProcessor};

/// Aisle Catalog command runner
#[derive(Parser)]
#[command(name = "aisle-catalog")]
#[command(about = "Run catalog commands and print the accumulated total")]
struct Cli {
    /// Command file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Log filter, overrides RUST_LOG (e.g. "debug", "aisle_catalog=trace")
    #[arg(long)]
    log_level: Option<String>,

    /// Item slots to pre-allocate
    #[arg(long, default_value_t = 1_024)]
    capacity: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    let catalog = Catalog::with_config(CatalogConfig::default().item_capacity(cli.capacity));
    let mut processor = CommandProcessor::new(catalog);

    let total = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            processor.run(BufReader::new(file))
        }
        None => processor.run(io::stdin().lock()),
    }
    .context("failed to read commands")?;

    info!(
        executed = processor.executed(),
        rejected = processor.rejected(),
        items = processor.catalog().len(),
        state_root = %processor.catalog().state_root_hex(),
        "run complete"
    );

    println!("{total:.2}");
    Ok(())
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
