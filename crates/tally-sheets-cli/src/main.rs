//! Tally Sheets CLI - XLSX template filling tool

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tally_sheets::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about = "Fill XLSX templates from JSON instruction sets")]
struct Cli {
    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template with a JSON instruction set
    Fill {
        /// Template workbook (.xlsx file or extracted directory)
        template: PathBuf,

        /// JSON instruction file ("-" reads stdin)
        #[arg(short, long)]
        data: PathBuf,

        /// Output workbook
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the sheets of a template and their worksheet parts
    Sheets {
        /// Template workbook
        template: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fill {
            template,
            data,
            output,
        } => fill(&template, &data, &output),
        Commands::Sheets { template } => list_sheets(&template),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fill(template_path: &Path, data: &Path, output: &Path) -> Result<()> {
    let json = read_data(data)?;
    let instructions = tally_sheets::instructions_from_json(&json)
        .with_context(|| format!("Failed to parse instructions from '{}'", data.display()))?;
    tracing::info!(count = instructions.len(), "loaded instructions");

    let mut template = Template::open(template_path)
        .with_context(|| format!("Failed to open '{}'", template_path.display()))?;
    let report = template
        .render(&instructions)
        .context("Failed to render template")?;

    template
        .save(output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    for name in &report.unknown_sheets {
        eprintln!("Warning: no sheet named '{}'", name);
    }
    for failure in &report.failures {
        eprintln!("Error: {}", failure);
    }
    eprintln!(
        "Wrote '{}' ({} sheet(s) rendered)",
        output.display(),
        report.sheets_rendered.len()
    );

    if !report.is_complete() {
        bail!("{} sheet(s) could not be rendered", report.failures.len());
    }
    Ok(())
}

fn read_data(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut json = String::new();
        io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read instructions from stdin")?;
        return Ok(json);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn list_sheets(template_path: &Path) -> Result<()> {
    let template = Template::open(template_path)
        .with_context(|| format!("Failed to open '{}'", template_path.display()))?;
    let sheets = template.sheets().context("Failed to read workbook")?;

    for (i, sheet) in sheets.iter().enumerate() {
        println!("{}\t{}\t{}", i, sheet.name, sheet.part);
    }

    Ok(())
}
