//! Geom CLI - Command-line tool for inspecting EngineX GeoFiles.
//!
//! This is the main entry point for the geom command-line application.

mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use geom::file::MapTriggers;
use geom::prelude::*;

/// Geom - EngineX GeoFile (.edb) inspection tool
#[derive(Parser)]
#[command(name = "geom")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the prologue and per-category counts
    Info {
        /// Path to the GeoFile
        #[arg(short, long, env = "GEOM_INPUT")]
        input: PathBuf,
    },

    /// List header records
    List {
        /// Path to the GeoFile
        #[arg(short, long, env = "GEOM_INPUT")]
        input: PathBuf,

        /// Only list one category (e.g. "map", "spreadsheet", "anim-skin")
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Decode data and text spreadsheets
    Sheets {
        /// Path to the GeoFile
        #[arg(short, long, env = "GEOM_INPUT")]
        input: PathBuf,

        /// JSON schema describing data sheet tables
        #[arg(short, long, env = "GEOM_SCHEMA")]
        schema: Option<PathBuf>,
    },

    /// Summarize map triggers
    Triggers {
        /// Path to the GeoFile
        #[arg(short, long, env = "GEOM_INPUT")]
        input: PathBuf,

        /// Print every trigger, not just the per-map summary
        #[arg(short, long)]
        detailed: bool,
    },

    /// List characters supported by each font
    Fonts {
        /// Path to the GeoFile
        #[arg(short, long, env = "GEOM_INPUT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::List { input, category } => cmd_list(&input, category)?,
        Commands::Sheets { input, schema } => cmd_sheets(&input, schema.as_deref())?,
        Commands::Triggers { input, detailed } => cmd_triggers(&input, detailed)?,
        Commands::Fonts { input } => cmd_fonts(&input)?,
    }

    Ok(())
}

fn open(path: &Path) -> Result<GeoArchive> {
    let start = Instant::now();
    let archive = GeoArchive::open(path)
        .with_context(|| format!("Failed to open GeoFile {}", path.display()))?;
    tracing::info!(elapsed = ?start.elapsed(), "loaded {}", archive.name());
    Ok(archive)
}

fn cmd_info(input: &Path) -> Result<()> {
    let archive = open(input)?;
    let file = archive.file();

    println!("{}", file.prologue());
    println!(
        "platform:       {} (section alignment {:#x})",
        file.platform(),
        file.platform().section_alignment()
    );
    println!();
    println!("{:<12} {:>6} {:>10}", "category", "count", "hashcodes");
    for category in Category::ALL {
        println!(
            "{:<12} {:>6} {:>10}",
            category.as_str(),
            file.category_headers(category).len(),
            file.hashcodes(category).len()
        );
    }
    println!("texture updates: {}", file.texture_updates());

    Ok(())
}

fn cmd_list(input: &Path, category: Option<Category>) -> Result<()> {
    let archive = open(input)?;
    let file = archive.file();

    let categories: Vec<Category> = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    let mut count = 0;
    for category in categories {
        for header in file.category_headers(category) {
            println!("{header}");
            count += 1;
        }
    }

    println!("\nTotal: {count} headers");

    Ok(())
}

fn cmd_sheets(input: &Path, schema: Option<&Path>) -> Result<()> {
    let schema = match schema {
        Some(path) => {
            let bytes = fs::read(path).context("Failed to read schema file")?;
            Some(SchemaCollection::from_json_slice(&bytes).context("Failed to parse schema")?)
        }
        None => None,
    };

    let archive = open(input)?;

    let mut errors = 0;
    for (hashcode, sheet) in archive.read_spreadsheets(schema.as_ref()) {
        match sheet {
            Ok(sheet) => println!("{sheet}"),
            Err(e) => {
                eprintln!("Error decoding spreadsheet {hashcode}: {e}");
                errors += 1;
            }
        }
    }

    if errors > 0 {
        println!("{errors} spreadsheets could not be decoded");
    }

    Ok(())
}

fn cmd_triggers(input: &Path, detailed: bool) -> Result<()> {
    let archive = open(input)?;

    for (hashcode, map) in archive.read_maps() {
        let map = match map {
            Ok(map) => map,
            Err(e) => {
                eprintln!("Error decoding map {hashcode}: {e}");
                continue;
            }
        };

        println!("{map}");
        if detailed {
            print_triggers(&map.triggers);
        }
    }

    Ok(())
}

fn print_triggers(triggers: &MapTriggers) {
    for (index, trigger) in triggers.triggers.iter().enumerate() {
        println!("  [{index:>4}] {trigger}");
        if let Some(ty) = triggers.trigger_type(trigger) {
            println!("         {ty}");
        }
        if let Some(script) = triggers.trigger_script(trigger) {
            println!("         {script}");
        }
    }
}

fn cmd_fonts(input: &Path) -> Result<()> {
    let archive = open(input)?;

    for (hashcode, font) in archive.read_fonts() {
        match font {
            Ok(font) => println!("{font}"),
            Err(e) => eprintln!("Error decoding font {hashcode}: {e}"),
        }
    }

    Ok(())
}
