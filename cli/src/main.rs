//! docline CLI - extract document lines and re-apply edits

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;

use docline::{apply_file, extract_file, load_edits, load_mappings, ApplyOptions};

#[derive(Parser)]
#[command(name = "docline")]
#[command(version)]
#[command(about = "Extract DOCX/PDF lines and re-apply edits while keeping formatting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract lines and their mappings to a JSON file
    Extract {
        /// Input .docx or .pdf file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Apply line edits and insertions to a document
    Apply {
        /// Original .docx or .pdf file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Mapping JSON produced by `extract`
        #[arg(short, long, value_name = "FILE")]
        mapping: PathBuf,

        /// Edits JSON: an array of line edits or {lineEdits, insertions}
        #[arg(short, long, value_name = "FILE")]
        edits: PathBuf,

        /// Output document
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Fail instead of ignoring insertions aimed at a PDF
        #[arg(long, env = "DOCLINE_STRICT_INSERTIONS")]
        strict_insertions: bool,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract { input, output } => cmd_extract(&input, &output),
        Commands::Apply {
            input,
            mapping,
            edits,
            output,
            strict_insertions,
        } => cmd_apply(&input, &mapping, &edits, &output, strict_insertions),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn cmd_extract(input: &Path, output: &Path) -> CliResult {
    let result = extract_file(input)?;

    ensure_parent(output)?;
    fs::write(output, serde_json::to_string_pretty(&result)?)?;
    log::info!("Wrote {} lines to {}", result.line_count(), output.display());

    println!(
        "{}",
        json!({ "ok": true, "kind": result.kind, "meta": result.meta })
    );
    Ok(())
}

fn cmd_apply(
    input: &Path,
    mapping: &Path,
    edits: &Path,
    output: &Path,
    strict_insertions: bool,
) -> CliResult {
    let mappings = load_mappings(mapping)?;
    let edits = load_edits(edits)?;
    log::debug!(
        "Loaded {} mappings, {} edits, {} insertions",
        mappings.len(),
        edits.line_edits.len(),
        edits.insertions.len()
    );

    let mut options = ApplyOptions::new();
    if strict_insertions {
        options = options.strict_insertions();
    }

    // Dispatch fails on an unsupported extension before anything is written.
    docline::detect_kind_from_path(input)?;
    ensure_parent(output)?;
    let result = apply_file(input, &mappings, &edits, output, &options)?;

    println!(
        "{}",
        json!({
            "ok": true,
            "appliedCount": result.applied_count(),
            "insertedCount": result.inserted_count(),
            "outputPath": result.output_path,
        })
    );
    Ok(())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
