//! volarc CLI
//!
//! A command-line utility for the VOL container-archive format: list,
//! extract (including LZH-compressed entries), create, repack, inspect.

mod utils;

use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use utils::{base_name, create_progress_bar, human_size};
use volarc_archive::{VolBuilder, VolReader};

#[derive(Parser)]
#[command(name = "volarc")]
#[command(author, version, about = "VOL container-archive utility")]
#[command(long_about = "
volarc reads and writes the VOL container-archive format and decodes
the LZH-compressed entries found in existing game archives. Newly
created archives always store files uncompressed.

Examples:
  volarc list RESOURCE.VOL
  volarc list RESOURCE.VOL --json
  volarc extract RESOURCE.VOL -o out/
  volarc extract RESOURCE.VOL INTRO.SCR THEME.SNG
  volarc create PATCH.VOL file1.scr file2.sng
  volarc repack RESOURCE.VOL
  volarc info RESOURCE.VOL
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Show verbose output (offsets and storage kinds)
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Extract files from an archive
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Files to extract (all if empty)
        files: Vec<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Create a new archive (files are stored uncompressed)
    #[command(alias = "c")]
    Create {
        /// Archive file to create
        archive: PathBuf,

        /// Files to pack
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Overwrite an existing archive without asking
        #[arg(short, long)]
        force: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rewrite an archive in place, dropping deleted entries
    Repack {
        /// Archive file to repack
        archive: PathBuf,
    },

    /// Show archive statistics
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List {
            archive,
            verbose,
            json,
        } => cmd_list(&archive, verbose, json),
        Commands::Extract {
            archive,
            output,
            files,
            verbose,
            quiet,
        } => cmd_extract(&archive, &output, &files, verbose, !quiet),
        Commands::Create {
            archive,
            files,
            force,
            verbose,
        } => cmd_create(&archive, &files, force, verbose),
        Commands::Repack { archive } => cmd_repack(&archive),
        Commands::Info { archive } => cmd_info(&archive),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize)]
struct EntryJson {
    name: String,
    size: u32,
    offset: u32,
    kind: String,
}

/// JSON output for archive listing.
#[derive(Debug, Serialize)]
struct ArchiveListJson {
    archive: String,
    entries: Vec<EntryJson>,
    total_size: u64,
}

fn cmd_list(archive: &Path, verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let reader = VolReader::open(archive)?;

    if json {
        let entries: Vec<EntryJson> = reader
            .entries()
            .iter()
            .map(|e| EntryJson {
                name: e.name.clone(),
                size: e.size,
                offset: e.data_offset,
                kind: e.kind.to_string(),
            })
            .collect();
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            total_size: entries.iter().map(|e| u64::from(e.size)).sum(),
            entries,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if verbose {
        println!("{:>10}  {:>10}  {:<12}  Name", "Size", "Offset", "Kind");
        for entry in reader.entries() {
            println!(
                "{:>10}  {:>10}  {:<12}  {}",
                entry.size,
                entry.data_offset,
                entry.kind.to_string(),
                entry.name
            );
        }
    } else {
        for entry in reader.entries() {
            println!("{:>10}  {}", entry.size, entry.name);
        }
    }
    println!(
        "{} entries, {} total",
        reader.len(),
        human_size(reader.entries().iter().map(|e| u64::from(e.size)).sum())
    );
    Ok(())
}

fn cmd_extract(
    archive: &Path,
    output: &Path,
    files: &[String],
    verbose: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = VolReader::open(archive)?;

    let indices: Vec<usize> = if files.is_empty() {
        (0..reader.len()).collect()
    } else {
        files
            .iter()
            .map(|name| {
                reader
                    .index_of(name)
                    .ok_or_else(|| volarc_core::VolError::name_not_found(name))
            })
            .collect::<Result<_, _>>()?
    };

    fs::create_dir_all(output)?;
    let pb = create_progress_bar(indices.len() as u64, progress && !verbose);

    for index in indices {
        let name = reader.name(index)?.to_owned();
        let dest = output.join(base_name(&name));
        let mut sink = BufWriter::new(File::create(&dest)?);
        let written = reader.extract(index, &mut sink)?;
        if verbose {
            println!("{} ({} bytes)", dest.display(), written);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    println!("Extracted to {}", output.display());
    Ok(())
}

fn cmd_create(
    archive: &Path,
    files: &[PathBuf],
    force: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if archive.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists, overwrite?", archive.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut builder = VolBuilder::new();
    for file in files {
        builder.add_path(file)?;
        if verbose {
            println!("Adding {}", file.display());
        }
    }
    builder.write_to(archive)?;
    println!(
        "Created {} ({} files, {})",
        archive.display(),
        builder.len(),
        human_size(fs::metadata(archive)?.len())
    );
    Ok(())
}

fn cmd_repack(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let before = fs::metadata(archive)?.len();
    volarc_archive::repack(archive)?;
    let after = fs::metadata(archive)?.len();
    println!(
        "Repacked {}: {} -> {}",
        archive.display(),
        human_size(before),
        human_size(after)
    );
    Ok(())
}


fn cmd_info(archive: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = VolReader::open(archive)?;
    let on_disk = fs::metadata(archive)?.len();

    let mut by_kind: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    for entry in reader.entries() {
        let slot = by_kind.entry(entry.kind.to_string()).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += u64::from(entry.size);
    }
    let total: u64 = reader.entries().iter().map(|e| u64::from(e.size)).sum();
    let unsupported = reader
        .entries()
        .iter()
        .filter(|e| !e.kind.is_supported())
        .count();

    println!("Archive: {}", archive.display());
    println!("  On disk:    {}", human_size(on_disk));
    println!("  Entries:    {}", reader.len());
    println!("  Decoded:    {}", human_size(total));
    for (kind, (count, bytes)) in &by_kind {
        println!("  {:<12} {} entries, {}", kind, count, human_size(*bytes));
    }
    if unsupported > 0 {
        println!("  {} entries use kinds this tool cannot extract", unsupported);
    }
    Ok(())
}
