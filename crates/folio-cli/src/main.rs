// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — command-line document operations.
//
// Entry point. Parses arguments, loads configuration, initialises logging on
// stderr, runs one command, and prints its JSON result as a single line on
// stdout. Exits with status 1 on any failure.

mod commands;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use folio_core::{FolioConfig, FolioError, SplitParams};

use commands::Context;
use report::Report;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Split, organise, rotate, crop, and merge PDF pages",
    version
)]
struct Cli {
    /// Directory receiving output files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a PDF into several files (bundled as a zip when more than one)
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Split mode: all, ranges, extract, every, or count
        #[arg(default_value = "all")]
        mode: String,

        /// Mode parameters as key=value: pageRanges, pageNumbers, everyPages, fileCount
        params: Vec<String>,

        /// Page ranges for "ranges" mode (e.g. "1-3,7")
        #[arg(long)]
        ranges: Option<String>,

        /// Page numbers for "extract" mode (e.g. "1,4,9")
        #[arg(long)]
        pages: Option<String>,

        /// Group size for "every" mode
        #[arg(long)]
        every: Option<String>,

        /// Number of output files for "count" mode
        #[arg(long)]
        count: Option<String>,
    },

    /// Copy selected pages into a single new PDF
    Extract {
        /// Input PDF file
        input: PathBuf,

        /// Pages to keep (e.g. "1,3,5-7")
        pages: String,
    },

    /// Reorder, rotate, and delete pages from a JSON description
    Organize {
        /// Input PDF file
        input: PathBuf,

        /// Operations, e.g. '{"order":[2,1],"rotate":{"1":90},"delete":[3]}'
        operations: String,
    },

    /// Delete pages
    Delete {
        /// Input PDF file
        input: PathBuf,

        /// Pages to delete (e.g. "1,3,5-7")
        pages: String,
    },

    /// Rotate pages by a quarter-turn multiple
    Rotate {
        /// Input PDF file
        input: PathBuf,

        /// Rotation angle (90, 180, 270, or negative for counter-clockwise)
        #[arg(allow_negative_numbers = true)]
        degrees: i64,

        /// Pages to rotate (default: all)
        #[arg(short, long)]
        pages: Option<String>,
    },

    /// Trim margins, in points, from every page
    Crop {
        /// Input PDF file
        input: PathBuf,

        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        left: f64,

        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        bottom: f64,

        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        right: f64,

        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        top: f64,
    },

    /// Merge PDFs in the order given
    Merge {
        /// Input PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show page count and page sizes
    Info {
        /// Input PDF file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let message = err.to_string();
            let first_line = message.lines().next().unwrap_or("invalid arguments");
            let first_line = first_line.trim_start_matches("error: ").to_string();
            return emit(&Report::failure(&anyhow!(first_line)));
        }
    };

    let config = load_config(&cli);
    let log_filter = config
        .as_ref()
        .map(|c| c.log_filter.clone())
        .unwrap_or_else(|_| FolioConfig::default().log_filter);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = match config.and_then(|config| run(cli.command, &Context::new(config))) {
        Ok(report) => report,
        Err(err) => {
            log_failure(&err);
            Report::failure(&err)
        }
    };
    emit(&report)
}

fn load_config(cli: &Cli) -> anyhow::Result<FolioConfig> {
    let mut config = match &cli.config {
        Some(path) => FolioConfig::load(path)?,
        None => FolioConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

fn run(command: Commands, ctx: &Context) -> anyhow::Result<Report> {
    tracing::debug!(output_dir = %ctx.destination.dir().display(), "Running command");
    match command {
        Commands::Split {
            input,
            mode,
            params,
            ranges,
            pages,
            every,
            count,
        } => {
            let mut split_params = parse_key_values(&params)?;
            split_params.page_ranges = ranges.or(split_params.page_ranges);
            split_params.page_numbers = pages.or(split_params.page_numbers);
            split_params.every_pages = every.or(split_params.every_pages);
            split_params.file_count = count.or(split_params.file_count);
            commands::split(ctx, &input, &mode, &split_params)
        }
        Commands::Extract { input, pages } => commands::extract(ctx, &input, &pages),
        Commands::Organize { input, operations } => commands::organize(ctx, &input, &operations),
        Commands::Delete { input, pages } => commands::delete(ctx, &input, &pages),
        Commands::Rotate {
            input,
            degrees,
            pages,
        } => commands::rotate(ctx, &input, degrees, pages.as_deref()),
        Commands::Crop {
            input,
            left,
            bottom,
            right,
            top,
        } => commands::crop(ctx, &input, [left, bottom, right, top]),
        Commands::Merge { inputs } => commands::merge(ctx, &inputs),
        Commands::Info { input } => commands::info(&input),
    }
}

/// Read `pageRanges=1-3` style parameters.
fn parse_key_values(raw: &[String]) -> Result<SplitParams, FolioError> {
    let mut params = SplitParams::default();
    for item in raw {
        let (key, value) = item.split_once('=').ok_or_else(|| {
            FolioError::InvalidParameter(format!("expected key=value, got {item:?}"))
        })?;
        let slot = match key.trim() {
            "pageRanges" => &mut params.page_ranges,
            "pageNumbers" => &mut params.page_numbers,
            "everyPages" => &mut params.every_pages,
            "fileCount" => &mut params.file_count,
            other => {
                return Err(FolioError::InvalidParameter(format!(
                    "unknown split parameter {other:?}"
                )));
            }
        };
        *slot = Some(value.to_string());
    }
    Ok(params)
}

fn log_failure(err: &anyhow::Error) {
    match err.downcast_ref::<FolioError>().map(FolioError::class) {
        Some(folio_core::ErrorClass::Io) => tracing::error!(error = %err, "command failed"),
        _ => tracing::warn!(error = %err, "command rejected"),
    }
}

fn emit(report: &Report) -> ExitCode {
    println!("{}", report.to_json_line());
    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_values_fill_split_params() {
        let params = parse_key_values(&[
            "pageRanges=1-3,5".to_string(),
            "fileCount=4".to_string(),
        ])
        .unwrap();
        assert_eq!(params.page_ranges.as_deref(), Some("1-3,5"));
        assert_eq!(params.file_count.as_deref(), Some("4"));
        assert!(params.every_pages.is_none());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(parse_key_values(&["size=3".to_string()]).is_err());
        assert!(parse_key_values(&["3".to_string()]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
