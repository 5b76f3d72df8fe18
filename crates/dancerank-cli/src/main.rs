//! DanceRank CLI - Command-line interface
//!
//! Usage:
//!   dancerank '<announcement text>'
//!   dancerank '<announcement text>' -o results.csv
//!   dancerank '<announcement text>' --config dancerank.toml --format json

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dancerank_core::{AppConfig, LoggingConfig, OutputFormat, ReferenceSets};
use dancerank_extractor::output::{write_to_path, write_to_stream, WriteMode};
use dancerank_extractor::reference::FileReferenceResolver;
use dancerank_extractor::{tagger, Extractor};

/// Exit status when the text could not be processed
const EXIT_EXTRACTION_FAILED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "dancerank")]
#[command(about = "Reads a text about a dancing tournament and writes a CSV row")]
#[command(version)]
#[command(after_help = "EXIT VALUES\n  0\tsuccess\n  1\tabort by user\n  2\tsyntax error\n  3\tcouldn't parse string")]
struct Cli {
    /// Text containing dancing tournament information
    text: String,

    /// CSV output file; appended to when it already exists
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (csv or json)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Year assumed for dates written without one
    #[arg(long)]
    year: Option<i32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = &result {
        eprintln!("dancerank: {:#}", e);
    }
    ExitCode::from(exit_status(&result))
}

fn exit_status(result: &anyhow::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => EXIT_EXTRACTION_FAILED,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config.logging);
    execute(&cli, &config)
}

/// Extract one record from `cli.text` and write it out
fn execute(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let tagger = tagger::from_config(&config.tagger).context("failed to set up tagger")?;
    let resolver = FileReferenceResolver::from_config(&config.reference);
    let references =
        ReferenceSets::resolve(&resolver).context("failed to load reference lists")?;
    tracing::info!(
        cities = references.cities().len(),
        clubs = references.clubs().len(),
        "Reference lists loaded"
    );

    let mut extractor = Extractor::new(tagger, references);
    if let Some(year) = config.extraction.fallback_year {
        extractor = extractor.with_fallback_year(year);
    }

    let record = extractor.extract(&cli.text).context("couldn't parse string")?;

    match &cli.output {
        Some(path) => {
            let mode = write_to_path(path, &record, config.output.format)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if mode == WriteMode::Append {
                tracing::info!("Appending to file.");
            }
        }
        None => write_to_stream(std::io::stdout().lock(), &record, config.output.format)?,
    }

    Ok(())
}

/// Config file (or defaults), then environment, then command-line flags
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };

    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(year) = cli.year {
        config.extraction.fallback_year = Some(year);
    }

    config.validate()?;
    Ok(config)
}

/// Logs go to stderr; stdout carries only the record
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
