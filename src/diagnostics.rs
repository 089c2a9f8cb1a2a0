//! Row-level diagnostics produced while ingesting a roster.
//!
//! Ingestion never writes to global logging state for rejected rows. Instead
//! the caller hands [`crate::ingest::ingest`] a [`DiagnosticSink`]:
//!
//! - `Vec<Diagnostic>` collects events in memory.
//! - [`ErrorLog`] renders one message per line into a writer, normally the
//!   `errors.log` file truncated at the start of each run.

use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::{debug, warn};

pub const DEFAULT_ERROR_LOG: &str = "errors.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The id parsed but the birthday did not.
    Birthday { id: i64 },
    /// Anything else: unsplittable line, missing column, non-integer id.
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based source line; the header is line 1.
    pub line: usize,
    /// Raw `id` field text, when the row had one.
    pub raw_id: Option<String>,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn birthday(line: usize, raw_id: impl Into<String>, id: i64) -> Self {
        Self {
            line,
            raw_id: Some(raw_id.into()),
            kind: DiagnosticKind::Birthday { id },
        }
    }

    pub fn general(line: usize, raw_id: Option<String>) -> Self {
        Self {
            line,
            raw_id,
            kind: DiagnosticKind::General,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::Birthday { id } => {
                write!(f, "Error processing line #{} for ID #{}", self.line, id)
            }
            DiagnosticKind::General => write!(
                f,
                "Error processing line #{} - general parsing error",
                self.line
            ),
        }
    }
}

/// Destination for rejected-row events. Reporting cannot fail from the
/// ingestor's point of view.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Message-only line writer: no timestamp, no level prefix.
pub struct ErrorLog<W: Write> {
    writer: W,
    written: usize,
    failure: Option<io::Error>,
}

impl ErrorLog<BufWriter<File>> {
    /// Creates (or truncates) the log file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("Creating error log {path:?}"))?;
        debug!("Writing row diagnostics to {path:?}");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ErrorLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            failure: None,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes the writer and returns the number of lines written, or the
    /// first write error seen while reporting.
    pub fn finish(mut self) -> Result<usize> {
        if let Some(err) = self.failure.take() {
            return Err(err).context("Writing row diagnostics");
        }
        self.writer.flush().context("Flushing row diagnostics")?;
        Ok(self.written)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for ErrorLog<W> {
    fn report(&mut self, diagnostic: Diagnostic) {
        if self.failure.is_some() {
            return;
        }
        match writeln!(self.writer, "{diagnostic}") {
            Ok(()) => self.written += 1,
            Err(err) => {
                warn!("Unable to record diagnostic for line {}: {err}", diagnostic.line);
                self.failure = Some(err);
            }
        }
    }
}
