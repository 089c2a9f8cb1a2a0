//! Text decoding and CSV field splitting helpers.
//!
//! - **Encoding**: downloaded bytes are decoded via `encoding_rs`, defaulting
//!   to UTF-8. A leading byte-order mark is dropped.
//! - **Field splitting**: rosters are read line by line so each row keeps its
//!   physical line number; [`split_line`] runs one line through the `csv`
//!   parser so quoting still works.

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn line_reader(line: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(line.as_bytes())
}

/// Splits a single physical line into fields. A line that holds no record
/// yields an empty record.
pub fn split_line(line: &str, delimiter: u8) -> Result<csv::StringRecord, csv::Error> {
    let mut reader = line_reader(line, delimiter);
    let mut record = csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

/// Splits `text` into physical lines, dropping a trailing `\r` from each.
pub fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
