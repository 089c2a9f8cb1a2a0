pub mod cli;
pub mod diagnostics;
pub mod fetch;
pub mod ingest;
pub mod io_utils;
pub mod lookup;
pub mod person;
pub mod session;

use std::{env, io, sync::OnceLock, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::Cli,
    diagnostics::ErrorLog,
    person::PersonTable,
    session::FAREWELL,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("birthday_lookup", LevelFilter::Warn);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let table = load_roster(&cli)?;

    println!();
    println!("You can now look up people by their ID number.");
    println!("Enter a negative number or 0 to exit.");

    ctrlc::set_handler(|| {
        println!("\n{FAREWELL}");
        std::process::exit(0);
    })
    .context("Installing interrupt handler")?;

    let stdin = io::stdin();
    session::run(&table, stdin.lock(), io::stdout())?;
    Ok(())
}

/// Fetches, decodes and ingests the roster named by `cli.url`, writing
/// rejected rows to `cli.error_log`.
pub fn load_roster(cli: &Cli) -> Result<PersonTable> {
    println!("Running main with URL = {}...", cli.url);
    let mut error_log = ErrorLog::create(&cli.error_log)?;

    println!("Downloading data from {}...", cli.url);
    let content = fetch_text(cli)
        .with_context(|| format!("Error downloading data from {}", cli.url))?;
    println!("Download successful!");

    println!("Processing data...");
    let delimiter = cli.delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let table = ingest::ingest(&content, delimiter, &mut error_log);
    let rejected = error_log
        .finish()
        .with_context(|| format!("Writing {:?}", cli.error_log))?;
    if rejected > 0 {
        info!("{rejected} row(s) recorded in {:?}", cli.error_log);
    }
    println!("Processing complete! {} people loaded.", table.len());
    Ok(table)
}

fn fetch_text(cli: &Cli) -> Result<String> {
    let encoding = io_utils::resolve_encoding(cli.input_encoding.as_deref())?;
    let bytes = fetch::download(&cli.url, Duration::from_secs(cli.timeout))?;
    debug!("Decoding {} byte(s) as {}", bytes.len(), encoding.name());
    io_utils::decode_bytes(&bytes, encoding)
}
