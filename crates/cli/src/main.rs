mod commands;
mod load;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imagedesk_core::{DUPLICATE_THRESHOLD, GROUPING_THRESHOLD, SIMILARITY_THRESHOLD};

/// ImageDesk — visual similarity grouping and duplicate detection
#[derive(Parser)]
#[command(name = "imagedesk", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group visually similar images in a directory
    Groups {
        /// Directory to scan
        dir: PathBuf,
        /// Grouping threshold in [0, 1]
        #[arg(long, default_value_t = GROUPING_THRESHOLD)]
        threshold: f64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List near-identical duplicate sets
    Duplicates {
        /// Directory to scan
        dir: PathBuf,
        /// Duplicate threshold in [0, 1]
        #[arg(long, default_value_t = DUPLICATE_THRESHOLD)]
        threshold: f64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show images similar to one image in the directory
    Similar {
        /// Directory to scan
        dir: PathBuf,
        /// Filename of the image to compare against
        name: String,
        /// Similarity threshold in [0, 1]
        #[arg(long, default_value_t = SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Groups {
            dir,
            threshold,
            json,
        } => commands::groups::run(&dir, threshold, json),
        Commands::Duplicates {
            dir,
            threshold,
            json,
        } => commands::duplicates::run(&dir, threshold, json),
        Commands::Similar {
            dir,
            name,
            threshold,
        } => commands::similar::run(&dir, &name, threshold),
    }
}
