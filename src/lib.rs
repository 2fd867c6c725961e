//! Cocomerge: merge COCO object detection datasets.
//!
//! Cocomerge combines multiple independently-collected COCO-format datasets
//! (a directory of media files plus one JSON descriptor each) into a single
//! dataset with globally unique, densely-packed ids. Images and annotations
//! are re-indexed from 0 in dataset order, media files are relocated into
//! the destination directory under their new ids, and one merged descriptor
//! is written at the end.
//!
//! # Modules
//!
//! - [`coco`]: descriptor model and JSON I/O (AnnotationSet, Image, ...)
//! - [`merge`]: the merge engine and its report types
//! - [`error`]: error types for cocomerge operations

pub mod coco;
pub mod error;
pub mod merge;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

pub use error::CocomergeError;

use merge::{MergeOptions, Merger};

/// The cocomerge CLI application.
#[derive(Parser)]
#[command(name = "cocomerge")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Merge source datasets into one re-indexed dataset.
    Merge(MergeArgs),
}

/// Arguments for the merge subcommand.
#[derive(clap::Args)]
struct MergeArgs {
    /// Source dataset directories, merged in the given order.
    ///
    /// The order decides the final ids: the first dataset's images come
    /// first, then the second's, and so on.
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Destination directory for relocated media and the merged descriptor.
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// File name of the merged descriptor inside the destination directory.
    #[arg(long, default_value = merge::DEFAULT_DESCRIPTOR_NAME)]
    descriptor_name: String,

    /// JSON file whose contents replace the merged 'info' block.
    #[arg(long)]
    info: Option<PathBuf>,

    /// JSON file whose contents replace the merged 'license' block.
    #[arg(long)]
    license: Option<PathBuf>,

    /// Drop annotations referencing a missing image instead of failing.
    #[arg(long)]
    allow_dangling: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Run the cocomerge CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CocomergeError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Merge(args)) => run_merge(args),
        None => {
            println!("cocomerge {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Merge COCO object detection datasets.");
            println!();
            println!("Run 'cocomerge --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the merge subcommand.
fn run_merge(args: MergeArgs) -> Result<(), CocomergeError> {
    let info = args.info.as_deref().map(read_metadata).transpose()?;
    let license = args.license.as_deref().map(read_metadata).transpose()?;

    let options = MergeOptions {
        info,
        license,
        descriptor_name: args.descriptor_name,
        allow_dangling: args.allow_dangling,
    };

    let merger = Merger::load(args.output, &args.sources, options)?;
    let report = merger.merge()?;

    match args.report.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(CocomergeError::ReportSerialize)?;
            println!("{json}");
        }
        _ => {
            // Default text output
            print!("{}", report);
        }
    }

    Ok(())
}

/// Reads an `--info`/`--license` override file as arbitrary JSON.
fn read_metadata(path: &Path) -> Result<Value, CocomergeError> {
    let file = File::open(path).map_err(CocomergeError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| CocomergeError::MetadataParse {
        path: path.to_path_buf(),
        source,
    })
}
