//! drumremap - Drum note remapping for MIDI files

use anyhow::Result;
use clap::Parser;
use drumremap::config;
use drumremap::engine::batch::{remap_batch, BatchOptions, FileOutcome};
use drumremap::engine::midi;
use drumremap::engine::Remapper;
use drumremap::mapping::{MappingLibrary, MappingSelection};

mod cli;

use cli::{Cli, Commands};

const EXAMPLE_MAPPING: &str = include_str!("../mappings/ssd5_to_gm.yaml");
const EXAMPLE_MAPPING_NAME: &str = "ssd5_to_gm.yaml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;
    let library = MappingLibrary::new(cfg.mappings_dir.clone());

    match cli.command {
        Commands::Remap {
            files,
            mapping,
            output,
            output_dir,
            overwrite,
            keep_channel,
        } => {
            let mut naming = cfg.output_naming(output)?;
            if let Some(dir) = output_dir {
                naming = naming.with_output_dir(dir);
            }
            let selection = MappingSelection::from_name(&mapping);

            println!("Mapping: {}", mapping);
            let table = library.load(&selection)?;
            let mut file_options = cfg.file_options();
            if keep_channel {
                file_options.drum_channel = None;
            }
            let options = BatchOptions {
                naming,
                file: file_options,
                overwrite,
            };

            let summary = remap_batch(&files, &Remapper::new(&table), &options);

            for entry in &summary.entries {
                println!("{} -> {}", entry.input.display(), entry.output.display());
                match &entry.outcome {
                    FileOutcome::Remapped(file) => println!(
                        "  Tracks: {}, note events: {}, changed: {}",
                        file.tracks, file.note_events, file.changed
                    ),
                    FileOutcome::Skipped => {
                        println!("  Skipped: output exists (use --overwrite to replace)")
                    }
                    FileOutcome::Failed(e) => println!("  Failed: {:#}", e),
                }
            }
            if !summary.report.is_empty() && !selection.is_as_source() {
                println!("Unmapped notes (left unchanged):");
                for (note, velocity, count) in summary.report.iter() {
                    println!("  note {} velocity {}: {} event(s)", note, velocity, count);
                }
            }
            println!(
                "Remapping complete: {} remapped, {} skipped, {} failed",
                summary.remapped(),
                summary.skipped(),
                summary.failed()
            );
            if summary.failed() > 0 {
                std::process::exit(1);
            }
        }

        Commands::Check { mapping } => {
            let selection = MappingSelection::from_name(&mapping);
            println!("Checking mapping {}...", mapping);

            match library.load(&selection) {
                Ok(table) => {
                    println!("Mapping is valid!");
                    println!("  Name: {}", table.name().unwrap_or("<unnamed>"));
                    println!("  Rules: {}", table.len());
                    for rule in table.rules() {
                        match rule.condition {
                            Some(v) => println!(
                                "    {:>3} -> {} (input velocity {})",
                                rule.from.get(), rule.resolution, v
                            ),
                            None => println!("    {:>3} -> {}", rule.from.get(), rule.resolution),
                        }
                    }
                }
                Err(e) => {
                    println!("Mapping is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::List => {
            println!("Mappings in {}:", library.dir().display());
            for name in library.list_available()? {
                println!("  - {}", name);
            }
        }

        Commands::Inspect { file } => {
            let stats = midi::note_stats(&file)?;
            println!("{}:", file.display());
            println!("  Note-on events: {}", stats.note_ons);
            println!("  Unique notes: {:?}", stats.notes);
            println!("  Channels (0-based): {:?}", stats.channels);
        }

        Commands::Init => {
            library.ensure_dir()?;
            let path = library.dir().join(EXAMPLE_MAPPING_NAME);
            if path.exists() {
                println!("{} already exists. Not overwriting.", path.display());
            } else {
                std::fs::write(&path, EXAMPLE_MAPPING)?;
                println!("Created {} with an example mapping.", path.display());
            }
        }
    }

    Ok(())
}
