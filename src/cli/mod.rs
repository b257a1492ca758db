//! CLI interface for drumremap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Remap drum note numbers in MIDI files between kit conventions
#[derive(Parser)]
#[command(name = "drumremap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "drumremap.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remap one or more MIDI files
    Remap {
        /// Input MIDI file paths
        #[arg(short, long = "file", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Mapping file name or path (e.g. "ssd5_to_gm.yaml", or "as Source")
        #[arg(short, long)]
        mapping: String,

        /// Output file, directory, or name template using {filename}, {ext}, {input_dir}
        #[arg(short, long)]
        output: Option<String>,

        /// Directory for relative outputs (default: next to each input)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Replace output files that already exist
        #[arg(long)]
        overwrite: bool,

        /// Keep source channels instead of moving notes to the drum channel
        #[arg(long)]
        keep_channel: bool,
    },

    /// Compile a mapping file and print its rules
    Check {
        /// Mapping file name or path
        mapping: String,
    },

    /// List available mapping files
    List,

    /// Show note and channel usage of a MIDI file
    Inspect {
        /// MIDI file path
        file: PathBuf,
    },

    /// Write an example mapping file into the mappings directory
    Init,
}
