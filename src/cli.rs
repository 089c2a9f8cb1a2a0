use std::path::PathBuf;

use clap::Parser;

use crate::{diagnostics::DEFAULT_ERROR_LOG, fetch::DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Load a CSV roster of people from a URL and look them up by id",
    long_about = None
)]
pub struct Cli {
    /// URL of the roster CSV (http, https or file)
    #[arg(long)]
    pub url: String,
    /// File that receives one line per rejected row (truncated on each run)
    #[arg(long = "error-log", default_value = DEFAULT_ERROR_LOG)]
    pub error_log: PathBuf,
    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the downloaded document (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
