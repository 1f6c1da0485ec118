//! Yolosplit: train/val splitting for YOLO-style detection datasets.
//!
//! Takes a dataset root with `images/` and `labels/` subtrees, pairs every
//! image with its `labels/<stem>.txt` annotation, and copies a random
//! train/val partition into a sibling `<name>_split` directory laid out the
//! way detection trainers expect.
//!
//! # Modules
//!
//! - [`split`]: Layout checks, pairing, split planning and output copying
//! - [`capture`]: Periodic frame capture feeding new images into a dataset
//! - [`error`]: Error types for yolosplit operations

pub mod capture;
pub mod error;
pub mod split;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use error::{ErrorKind, YoloSplitError};
pub use split::{partition, partition_with_rng, split_dataset, SplitOptions, SplitReport};

/// The yolosplit CLI application.
#[derive(Parser)]
#[command(name = "yolosplit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Split a dataset into train and val subsets.
    Split(SplitArgs),
}

/// Report output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the split subcommand.
#[derive(clap::Args)]
struct SplitArgs {
    /// Dataset root containing images/ and labels/.
    source: PathBuf,

    /// Fraction of pairs assigned to train, between 0 and 1 (exclusive).
    #[arg(long, default_value_t = split::DEFAULT_TRAIN_RATIO)]
    ratio: f64,

    /// Seed for a reproducible split.
    #[arg(long, env = "YOLOSPLIT_SEED")]
    seed: Option<u64>,

    /// Report the split without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Also write a data.yaml (class names from the source's data.yaml or classes.txt).
    #[arg(long)]
    data_yaml: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    output: ReportFormat,
}

/// Run the yolosplit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), YoloSplitError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Split(args)) => run_split(args),
        None => {
            println!("yolosplit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Train/val splitter for YOLO-style datasets.");
            println!();
            println!("Run 'yolosplit --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

/// Execute the split subcommand.
fn run_split(args: SplitArgs) -> Result<(), YoloSplitError> {
    let opts = SplitOptions {
        train_ratio: args.ratio,
        seed: args.seed,
        dry_run: args.dry_run,
        write_data_yaml: args.data_yaml,
    };
    let report = split_dataset(&args.source, &opts)?;

    match args.output {
        ReportFormat::Json => println!("{}", report.to_json()?),
        ReportFormat::Text => print!("{}", report),
    }

    Ok(())
}
