//! deckfill CLI - PowerPoint template placeholder substitution
//!
//! Serves the upload/process HTTP API, or fills templates from the command line.

mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use deckfill::service::{
    ServiceConfig, DEFAULT_BIND, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_STORAGE_DIR,
};
use deckfill::store::DEFAULT_TEMPLATE_NAME;
use deckfill::{FillOptions, Presentation, Replacements, Slide, TableMatching};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Fill {placeholder} tokens in PowerPoint templates
#[derive(Parser)]
#[command(
    name = "deckfill",
    author = "iyulab",
    version,
    about = "Fill placeholders in PowerPoint templates",
    long_about = "deckfill - PowerPoint (.pptx) template placeholder substitution.\n\n\
                  Replaces {key} tokens in text shapes and tables, from the command line \
                  or through a small HTTP service."
)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "DECKFILL_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Directory holding the uploaded template
        #[arg(long, env = "DECKFILL_STORAGE_DIR", default_value = DEFAULT_STORAGE_DIR)]
        storage_dir: PathBuf,

        /// File name of the stored template
        #[arg(long, env = "DECKFILL_TEMPLATE_NAME", default_value = DEFAULT_TEMPLATE_NAME)]
        template_name: String,

        /// Prefix of the returned file name
        #[arg(long, env = "DECKFILL_OUTPUT_PREFIX", default_value = DEFAULT_OUTPUT_PREFIX)]
        output_prefix: String,

        /// Maximum request body size in MiB
        #[arg(long, env = "DECKFILL_MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_BYTES / (1024 * 1024))]
        max_upload_mb: usize,

        /// Placeholder matching inside table cells
        #[arg(long, env = "DECKFILL_TABLE_MATCHING", default_value = "per-run")]
        table_matching: TableMode,
    },

    /// Fill a template and write the result
    Fill {
        /// Template file path
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with replacement values
        #[arg(long)]
        values: Option<PathBuf>,

        /// Replacement value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,

        /// Placeholder matching inside table cells
        #[arg(long, default_value = "per-run")]
        table_matching: TableMode,

        /// Print the fill report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show slides, shapes and placeholders of a template
    Info {
        /// Template file path
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no indentation)
        #[arg(long, requires = "json")]
        compact: bool,
    },

    /// Show version information
    Version,
}

/// Table matching mode
#[derive(Clone, Copy, ValueEnum)]
enum TableMode {
    /// Match within each run; tokens split across runs are kept
    PerRun,
    /// Match across the whole cell text
    WholeCell,
}

impl From<TableMode> for TableMatching {
    fn from(mode: TableMode) -> Self {
        match mode {
            TableMode::PerRun => TableMatching::PerRun,
            TableMode::WholeCell => TableMatching::WholeCell,
        }
    }
}

/// Template structure as printed by `info --json`.
#[derive(Serialize)]
struct TemplateInfo<'a> {
    file: String,
    parts: usize,
    slides: &'a [Slide],
    placeholders: BTreeSet<String>,
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => Level::INFO,
        _ => Level::WARN,
    };
    logging::init(default_level, cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Serve {
            bind,
            storage_dir,
            template_name,
            output_prefix,
            max_upload_mb,
            table_matching,
        } => {
            let config = ServiceConfig::new()
                .with_bind(bind)
                .with_storage_dir(storage_dir)
                .with_template_name(template_name)
                .with_output_prefix(output_prefix)
                .with_max_upload_bytes(max_upload_mb.saturating_mul(1024 * 1024))
                .with_fill_options(
                    FillOptions::new().with_table_matching(table_matching.into()),
                );

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(deckfill::service::serve(config))?;
        }

        Commands::Fill {
            input,
            output,
            values,
            set,
            table_matching,
            json,
        } => {
            let mut replacements = match values {
                Some(path) => Replacements::from_json_slice(&fs::read(&path)?)?,
                None => Replacements::new(),
            };
            for (key, value) in set {
                replacements.insert(key, value);
            }
            if replacements.is_empty() {
                return Err("no replacement values given (use --values or --set)".into());
            }

            let pb = create_spinner("Filling template...");
            let options = FillOptions::new().with_table_matching(table_matching.into());
            let report = deckfill::fill_file(&input, &output, &replacements, &options)?;
            pb.finish_and_clear();

            if json {
                println!("{}", to_json(&report, false)?);
                return Ok(());
            }
            println!(
                "{} Replaced {} placeholders across {} slides: {}",
                "✓".green().bold(),
                report.replacements,
                report.slides,
                output.display()
            );
        }

        Commands::Info {
            input,
            json,
            compact,
        } => {
            let pb = create_spinner("Analyzing template...");
            let deck = Presentation::open(&input)?;
            let placeholders = deckfill::find_placeholders(&deck)?;
            pb.finish_and_clear();

            if json {
                let info = TemplateInfo {
                    file: input.file_name().unwrap_or_default().to_string_lossy().into_owned(),
                    parts: deck.package().list_files().len(),
                    slides: deck.slides(),
                    placeholders,
                };
                println!("{}", to_json(&info, compact)?);
                return Ok(());
            }

            println!("{}", "Template Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Package parts".bold(), deck.package().list_files().len());
            println!("{}: {}", "Slides".bold(), deck.slide_count());

            for (index, slide) in deck.slides().iter().enumerate() {
                println!(
                    "  {} {}: {} shapes, {} text frames, {} tables",
                    "•".blue(),
                    index + 1,
                    slide.shapes.len(),
                    slide.text_frame_count(),
                    slide.table_count()
                );
            }

            println!("\n{}", "Placeholders".cyan().bold());
            println!("{}", "─".repeat(40));
            if placeholders.is_empty() {
                println!("{} No placeholders found", "!".yellow().bold());
            } else {
                for key in &placeholders {
                    println!("  {{{}}}", key);
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "deckfill".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("PowerPoint template placeholder substitution");
    println!();
    println!("Supported formats: PPTX");
    println!("Repository: https://github.com/iyulab/deckfill");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
