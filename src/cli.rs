//! Command-line interface for assessing datasets from the shell.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use crate::checks::{run_named_checks, Dimension, Severity};
use crate::dataset::{ArrowDataset, Dataset};
use crate::error::{Error, Result};
use crate::report::{aggregate, AggregateReport};

/// Heuristic data quality assessment for tabular datasets.
#[derive(Debug, Parser)]
#[command(name = "calidad", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assess a CSV file and print the quality report
    Check {
        /// Path to the CSV file
        path: PathBuf,

        /// Dimensions to run (default: all six)
        #[arg(short, long, value_delimiter = ',')]
        dimensions: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print schema and shape information for a CSV file
    Info {
        /// Path to the CSV file
        path: PathBuf,
    },

    /// List the available quality dimensions
    Dimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Human-readable summary
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Parses arguments and runs the requested command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check {
            path,
            dimensions,
            format,
            output,
        } => check(&path, &dimensions, format, output.as_deref()),
        Commands::Info { path } => info(&path),
        Commands::Dimensions => {
            for dimension in Dimension::ALL {
                println!("{dimension}");
            }
            Ok(())
        }
    }
}

fn check(
    path: &Path,
    dimensions: &[String],
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let dataset = ArrowDataset::from_csv(path)?;
    let results = run_named_checks(&dataset, dimensions)?;
    let report = aggregate(&results);

    let rendered = match format {
        Format::Json => report.to_json()?,
        Format::Text => render_text(&report),
    };

    match output {
        Some(target) => {
            std::fs::write(target, rendered).map_err(|e| Error::io(e, target))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn info(path: &Path) -> Result<()> {
    let dataset = ArrowDataset::from_csv(path)?;
    let schema = dataset.schema();

    println!("rows:    {}", dataset.len());
    println!("columns: {}", schema.fields().len());
    println!("batches: {}", dataset.num_batches());
    println!();
    for field in schema.fields() {
        println!("  {:<30} {}", field.name(), field.data_type());
    }
    Ok(())
}

fn render_text(report: &AggregateReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "overall: {:.2} ({})",
        report.overall_score, report.grade
    );

    let summary = report.severity_summary();
    let _ = writeln!(
        out,
        "issues:  {} ({} high, {} medium, {} low)",
        summary.total(),
        summary.high,
        summary.medium,
        summary.low
    );
    let _ = writeln!(out);

    for (dimension, result) in &report.results {
        let _ = writeln!(out, "{:<14} {:>6.2}", dimension.name(), result.score);
        for issue in &result.issues {
            let marker = match issue.severity {
                Severity::High => "!!",
                Severity::Medium => " !",
                Severity::Low => "  ",
            };
            let _ = writeln!(out, "  {marker} [{}] {}", issue.severity, issue.title);
        }
    }

    out
}
