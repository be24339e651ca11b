//! chartmap CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use chartmap_cli::commands;
use chartmap_cli::logging::{LogConfig, LogFormat, init_logging};
use clap::{ColorChoice, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let config = commands::load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::ChartTypes => {
            let types = commands::chart_types(&config)?;
            if cli.json {
                print_json(&types)?;
            } else {
                summary::print_chart_types(&types);
            }
            Ok(0)
        }
        Command::Catalog(args) => {
            let catalog = commands::catalog(
                &config,
                &args.chart_id,
                &args.template_version,
                &args.spec_version,
            )?;
            if cli.json {
                print_json(&catalog)?;
            } else {
                summary::print_catalog(&catalog);
            }
            Ok(0)
        }
        Command::Validate(args) => {
            let mapping = commands::load_mapping(&args.mapping)?;
            let report = commands::validate(&config, &mapping)?;
            if cli.json {
                print_json(&report)?;
            } else {
                summary::print_validation(&report);
            }
            Ok(if report.passed { 0 } else { 1 })
        }
        Command::DryRun(args) => {
            let mapping = commands::load_mapping(&args.mapping)?;
            let response = commands::dry_run(&config, &mapping, &args.data);
            if cli.json {
                print_json(&response)?;
            } else {
                summary::print_dry_run(&response);
            }
            Ok(if response.is_ok() { 0 } else { 1 })
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone());
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
