//! Interactive lookup loop.
//!
//! The loop is generic over its input and output so it can be driven from
//! tests with in-memory buffers. Ctrl+C is handled outside the loop by the
//! signal handler installed in [`crate::run`], which prints [`FAREWELL`] and
//! exits with status 0.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::debug;

use crate::{lookup, person::PersonTable};

pub const PROMPT: &str = "Enter an ID to lookup: ";
pub const FAREWELL: &str = "Goodbye!";
pub const INVALID_INPUT: &str = "Please enter a valid number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Lookup(i64),
    Exit,
    Invalid,
}

/// Zero or a negative number ends the session; anything that is not an
/// integer is rejected.
pub fn parse_command(input: &str) -> Command {
    match input.trim().parse::<i64>() {
        Ok(id) if id <= 0 => Command::Exit,
        Ok(id) => Command::Lookup(id),
        Err(_) => Command::Invalid,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub lookups: usize,
    pub invalid_inputs: usize,
}

pub fn run<R, W>(table: &PersonTable, mut input: R, mut output: W) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}").context("Writing prompt")?;
        output.flush().context("Flushing prompt")?;

        line.clear();
        let read = input.read_line(&mut line).context("Reading lookup input")?;
        if read == 0 {
            debug!("Input closed; ending session");
            writeln!(output, "\n{FAREWELL}").context("Writing farewell")?;
            break;
        }

        match parse_command(&line) {
            Command::Exit => {
                writeln!(output, "{FAREWELL}").context("Writing farewell")?;
                break;
            }
            Command::Invalid => {
                summary.invalid_inputs += 1;
                writeln!(output, "{INVALID_INPUT}").context("Writing re-prompt")?;
            }
            Command::Lookup(id) => {
                summary.lookups += 1;
                writeln!(output, "{}", lookup::describe(id, table))
                    .context("Writing lookup result")?;
            }
        }
    }
    output.flush().context("Flushing session output")?;
    debug!(
        "Session ended after {} lookup(s) and {} invalid input(s)",
        summary.lookups, summary.invalid_inputs
    );
    Ok(summary)
}
