//! CLI argument definitions for chartmap.

use std::path::PathBuf;

use chartmap_catalog::DEFAULT_TEMPLATE_VERSION;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "chartmap",
    version,
    about = "Map tabular data onto chart templates through versioned placeholders",
    long_about = "Inspect placeholder catalogs, validate mappings and dry-run them \
                  against CSV tables to preview the final chart option."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Series limits per template category (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List supported chart types with their series limits.
    ChartTypes,

    /// Print the placeholder catalog of a chart.
    Catalog(CatalogArgs),

    /// Check a mapping file against its chart's catalog.
    Validate(MappingArgs),

    /// Run a mapping against CSV tables and print the resulting chart option.
    DryRun(DryRunArgs),
}

#[derive(Parser)]
pub struct CatalogArgs {
    /// Chart id, which is also the chart type (e.g. stacked_line_chart).
    #[arg(value_name = "CHART_ID")]
    pub chart_id: String,

    #[arg(long = "template-version", default_value = DEFAULT_TEMPLATE_VERSION)]
    pub template_version: String,

    #[arg(long = "spec-version", default_value = "v1")]
    pub spec_version: String,
}

#[derive(Parser)]
pub struct MappingArgs {
    /// Mapping JSON file.
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,
}

#[derive(Parser)]
pub struct DryRunArgs {
    /// Mapping JSON file.
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Directory holding one `<table>.csv` per source table.
    #[arg(long = "data", value_name = "DIR")]
    pub data: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
