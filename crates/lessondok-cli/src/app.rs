//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lessondok_core::OutputKind;
use lessondok_data::{CsvStore, DataEngine, ExcelSource, RecordStore};
use lessondok_generator::{ModelSettings, OpenAiClient, PromptTemplate};

use crate::orchestrator::{check_templates, Orchestrator, RunReport};
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "lessondok")]
#[command(author, version, about = "Lesson documents from lesson tables", long_about = None)]
struct Cli {
    /// Configuration file (default: ./lessondok.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing activity documents
    Documents {
        /// Render into a scratch directory without updating the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Create missing slide decks
    Slides {
        /// Render into a scratch directory without updating the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Create missing lesson plans
    LessonPlans {
        /// Render into a scratch directory without updating the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Create every missing document, slide deck and lesson plan
    All {
        /// Render into a scratch directory without updating the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate activity content for unprocessed lesson-sequence rows
    Content,

    /// Copy sheets of an Excel workbook into the store
    Import {
        /// Input XLSX file
        workbook: PathBuf,

        /// Sheet to import (default: every sheet, each into the table of the same name)
        #[arg(long)]
        sheet: Option<String>,

        /// Destination table (default: the sheet name)
        #[arg(long, requires = "sheet")]
        table: Option<String>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Documents { dry_run } => {
            documents_command(&settings, &[OutputKind::ActivityDocument], dry_run)?;
        }
        Commands::Slides { dry_run } => {
            documents_command(&settings, &[OutputKind::SlideDeck], dry_run)?;
        }
        Commands::LessonPlans { dry_run } => {
            documents_command(&settings, &[OutputKind::LessonPlan], dry_run)?;
        }
        Commands::All { dry_run } => {
            documents_command(&settings, &OutputKind::ALL, dry_run)?;
        }
        Commands::Content => {
            content_command(&settings)?;
        }
        Commands::Import {
            workbook,
            sheet,
            table,
        } => {
            import_command(&settings, &workbook, sheet.as_deref(), table.as_deref())?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` wins unless `verbose` is set
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lessondok=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lessondok=info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_store(settings: &Settings) -> Result<CsvStore> {
    CsvStore::new(&settings.store.root)
        .with_context(|| format!("Failed to open lesson store: {}", settings.store.root.display()))
}

/// Execute a document generation command
pub fn documents_command(settings: &Settings, kinds: &[OutputKind], dry_run: bool) -> Result<RunReport> {
    println!("lessondok v{}", lessondok_core::VERSION);
    check_templates(settings, kinds)?;
    let mut store = open_store(settings)?;

    let report = if dry_run {
        let scratch = tempfile::Builder::new()
            .prefix("lessondok-dry-run-")
            .tempdir()
            .context("Failed to create scratch directory")?;
        println!("Dry run: rendering into {}", scratch.path().display());
        Orchestrator::new(&mut store, settings)
            .dry_run(scratch.path())
            .generate_missing(kinds)?
    } else {
        Orchestrator::new(&mut store, settings).generate_missing(kinds)?
    };

    print_report(&report);
    Ok(report)
}

/// Execute the content generation command
pub fn content_command(settings: &Settings) -> Result<RunReport> {
    println!("lessondok v{}", lessondok_core::VERSION);
    let mut store = open_store(settings)?;

    let table = &settings.store.prompt_details;
    let Some(row) = store.read_all(table)?.into_iter().next() else {
        bail!("Prompt table '{}' has no rows", table);
    };
    let prompt = PromptTemplate::from_record(&row).context("Invalid prompt settings")?;
    let model = ModelSettings::from_record(
        &row,
        settings.generator.endpoint.as_deref(),
        settings.generator.model.as_deref(),
        &settings.generator.api_key_env,
    )
    .context("Invalid model settings")?;

    let client = OpenAiClient::new(model)
        .with_timeout(Duration::from_secs(settings.generator.timeout_secs))
        .with_temperature(settings.generator.temperature)
        .with_max_tokens(settings.generator.max_tokens);

    let report = Orchestrator::new(&mut store, settings).generate_content(&client, &prompt)?;
    print_report(&report);
    Ok(report)
}

/// Execute the import command
pub fn import_command(
    settings: &Settings,
    workbook: &Path,
    sheet: Option<&str>,
    table: Option<&str>,
) -> Result<Vec<(String, usize)>> {
    println!("lessondok v{}", lessondok_core::VERSION);
    println!("Importing: {}", workbook.display());

    if !workbook.exists() {
        bail!("Input file not found: {}", workbook.display());
    }
    fs::create_dir_all(&settings.store.root).with_context(|| {
        format!(
            "Failed to create store directory: {}",
            settings.store.root.display()
        )
    })?;
    let store = open_store(settings)?;

    let imported = match sheet {
        Some(sheet) => {
            let source = ExcelSource::new(workbook)
                .with_context(|| format!("Failed to open workbook: {}", workbook.display()))?;
            let data = source.read_sheet(sheet)?;
            let name = table.unwrap_or(sheet);
            store.import(name, &data)?;
            vec![(name.to_string(), data.rows.len())]
        }
        None => DataEngine::import_workbook(workbook, &store, &[])
            .with_context(|| format!("Failed to import workbook: {}", workbook.display()))?,
    };

    for (name, rows) in &imported {
        println!("  Imported: {} ({} rows) -> {}", name, rows, store.table_path(name).display());
    }
    Ok(imported)
}

fn print_report(report: &RunReport) {
    for doc in &report.created {
        println!("  Created: {}", doc.path.display());
        let unresolved = doc.report.unresolved();
        if !unresolved.is_empty() {
            println!("    unresolved: {}", unresolved.join(", "));
        }
        let missing = doc.report.anchors_not_found();
        if !missing.is_empty() {
            println!("    no anchor for: {}", missing.join(", "));
        }
        let hidden = doc.report.hidden_slides();
        if !hidden.is_empty() {
            let slides: Vec<String> = hidden.iter().map(|s| s.to_string()).collect();
            println!("    hidden slides: {}", slides.join(", "));
        }
    }
    for failure in &report.failures {
        println!("  Failed: {}", failure);
    }
    println!();
    println!("{}", report.summary());
}
