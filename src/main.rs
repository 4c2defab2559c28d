//! sri-stamp - Subresource integrity stamping for static HTML.

mod cli;
mod config;
mod integrity;
mod logger;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::IntegrityConfig;
use integrity::Report;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = IntegrityConfig::load(&cli)?;
    debug!("config"; "{:?}", config);

    let result = if config.check {
        integrity::check_integrity(&config)
    } else {
        integrity::update_integrity(&config)
    };

    conclude(result).map(ExitCode::from)
}

/// Log the outcome of a run and pick the process exit status.
///
/// A missing `<head>` is reported but exits zero; mismatches exit one.
/// Filesystem errors are handed to `anyhow`.
fn conclude(result: integrity::Result<Report>) -> Result<u8> {
    match result {
        Ok(report) => {
            log!("done"; "{}", report);
            Ok(0)
        }
        Err(err) if err.is_reportable() => {
            log!("error"; "{}", err);
            Ok(u8::from(err.fails_run()))
        }
        Err(err) => Err(err.into()),
    }
}
