//! Dentascan command line
//!
//! Builds and inspects point-record caches for Teeth3DS-style scan
//! collections.
//!
//! - `process`: sample every mesh of a split into the cache
//! - `inspect`: summarize one cached record
//! - `sample`: sample a single mesh file
//! - `archives`: list the published dataset archives

mod app;
mod errors;

use clap::{Args, Parser, Subcommand};
use dentascan_data::DEFAULT_SAMPLE_COUNT;
use dentascan_dataset::DEFAULT_SPLIT;
use std::path::PathBuf;

/// Dentascan - dental scan point-cloud dataset tools
#[derive(Parser, Debug)]
#[command(name = "dentascan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process every mesh of a split into the record cache
    Process {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Points per record
        #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        samples: usize,

        /// Seed for the with-replacement branch
        #[arg(long)]
        seed: Option<u64>,

        /// Reprocess entries that are already cached
        #[arg(long)]
        force: bool,
    },

    /// Print a summary of one cached record
    Inspect {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Position in the manifest
        #[arg(short, long)]
        index: usize,
    },

    /// Sample a single mesh file
    Sample {
        /// Mesh file (.obj or .ply)
        mesh: PathBuf,

        /// Points to sample
        #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        samples: usize,

        /// Seed for the with-replacement branch
        #[arg(long)]
        seed: Option<u64>,

        /// Write the record as JSON to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the published dataset archives
    Archives,
}

#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Dataset root containing `raw/`
    #[arg(short, long)]
    root: PathBuf,

    /// Split name
    #[arg(short, long, default_value = DEFAULT_SPLIT)]
    split: String,

    /// Use the testing manifests instead of the training ones
    #[arg(long)]
    test: bool,
}

fn main() {
    let cli = Cli::parse();
    app::init_logging(&cli.log_level);

    if let Err(e) = app::run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
