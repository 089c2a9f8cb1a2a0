//! Roster ingestion: raw CSV text in, validated [`PersonTable`] out.
//!
//! Each data row goes through two steps:
//!
//! 1. [`parse_row`] splits the line, pulls out `id`, `name` and `birthday` by
//!    header name and converts the id.
//! 2. [`parse_birthday`] runs only once step 1 has succeeded and accepts
//!    `DD/MM/YYYY` and nothing else.
//!
//! A row that fails either step is dropped and reported to the caller's
//! [`DiagnosticSink`] with its physical line number. Rejected rows never stop
//! ingestion.

use std::sync::LazyLock;

use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;
use thiserror::Error;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink},
    io_utils,
    person::{Person, PersonTable},
};

pub const ID_COLUMN: &str = "id";
pub const NAME_COLUMN: &str = "name";
pub const BIRTHDAY_COLUMN: &str = "birthday";

const BIRTHDAY_FORMAT: &str = "%d/%m/%Y";

static BIRTHDAY_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("birthday pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("line could not be split into fields: {0}")]
    Malformed(String),
    #[error("row has no '{column}' column")]
    MissingColumn {
        column: &'static str,
        raw_id: Option<String>,
    },
    #[error("id '{0}' is not an integer")]
    InvalidId(String),
    #[error("birthday '{raw}' for id {id} is not a DD/MM/YYYY date")]
    InvalidBirthday { id: i64, raw_id: String, raw: String },
}

impl RowError {
    /// Raw `id` field text of the rejected row, when it had one.
    pub fn raw_id(&self) -> Option<&str> {
        match self {
            RowError::Malformed(_) => None,
            RowError::MissingColumn { raw_id, .. } => raw_id.as_deref(),
            RowError::InvalidId(raw_id) | RowError::InvalidBirthday { raw_id, .. } => {
                Some(raw_id.as_str())
            }
        }
    }

    /// Maps the failure onto the diagnostic reported for source line `line`.
    pub fn diagnostic(&self, line: usize) -> Diagnostic {
        let raw_id = self.raw_id().map(str::to_string);
        match self {
            RowError::InvalidBirthday { id, .. } => Diagnostic {
                line,
                raw_id,
                kind: DiagnosticKind::Birthday { id: *id },
            },
            RowError::Malformed(_) | RowError::MissingColumn { .. } | RowError::InvalidId(_) => {
                Diagnostic::general(line, raw_id)
            }
        }
    }
}

/// Header positions of the three roster columns. Columns are matched by name,
/// so their order in the file does not matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterColumns {
    pub id: Option<usize>,
    pub name: Option<usize>,
    pub birthday: Option<usize>,
}

impl RosterColumns {
    pub fn from_headers(headers: &csv::StringRecord) -> Self {
        let position = |column: &str| headers.iter().position(|header| header == column);
        Self {
            id: position(ID_COLUMN),
            name: position(NAME_COLUMN),
            birthday: position(BIRTHDAY_COLUMN),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.id.is_some() && self.name.is_some() && self.birthday.is_some()
    }
}

/// Output of step 1: the id is typed, the birthday is still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPerson {
    pub id: i64,
    pub raw_id: String,
    pub name: String,
    pub birthday: String,
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: Option<usize>,
    column: &'static str,
    raw_id: Option<&str>,
) -> Result<&'r str, RowError> {
    index
        .and_then(|idx| record.get(idx))
        .ok_or_else(|| RowError::MissingColumn {
            column,
            raw_id: raw_id.map(str::to_string),
        })
}

/// Step 1: extract the three fields and convert the id.
pub fn parse_row(record: &csv::StringRecord, columns: &RosterColumns) -> Result<RawPerson, RowError> {
    let raw_id = field(record, columns.id, ID_COLUMN, None)?;
    let name = field(record, columns.name, NAME_COLUMN, Some(raw_id))?;
    let birthday = field(record, columns.birthday, BIRTHDAY_COLUMN, Some(raw_id))?;
    let id = raw_id
        .trim()
        .parse::<i64>()
        .map_err(|_| RowError::InvalidId(raw_id.to_string()))?;
    Ok(RawPerson {
        id,
        raw_id: raw_id.to_string(),
        name: name.to_string(),
        birthday: birthday.to_string(),
    })
}

/// Step 2: `DD/MM/YYYY` with zero-padded day and month, on a real calendar day.
pub fn parse_birthday(value: &str) -> Option<NaiveDate> {
    if !BIRTHDAY_SHAPE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, BIRTHDAY_FORMAT).ok()
}

/// Runs both steps for one already-split row.
pub fn parse_person(
    record: &csv::StringRecord,
    columns: &RosterColumns,
) -> Result<(i64, Person), RowError> {
    let raw = parse_row(record, columns)?;
    match parse_birthday(&raw.birthday) {
        Some(birthday) => Ok((raw.id, Person::new(raw.name, birthday))),
        None => Err(RowError::InvalidBirthday {
            id: raw.id,
            raw_id: raw.raw_id,
            raw: raw.birthday,
        }),
    }
}

/// Builds the person table from the full text of a roster.
///
/// Line 1 is the header. Data rows are numbered by their physical line, so
/// empty lines are skipped but still counted. A line holding only whitespace
/// is a row like any other and is rejected. Duplicate ids keep the last row.
pub fn ingest<S>(content: &str, delimiter: u8, sink: &mut S) -> PersonTable
where
    S: DiagnosticSink + ?Sized,
{
    let mut table = PersonTable::new();
    let trimmed = content.trim_end();
    if trimmed.is_empty() {
        info!("Roster is empty");
        return table;
    }

    let mut lines = io_utils::physical_lines(trimmed);
    let header_line = lines.next().unwrap_or_default();
    let columns = match io_utils::split_line(header_line, delimiter) {
        Ok(headers) => RosterColumns::from_headers(&headers),
        Err(err) => {
            debug!("Unable to read roster header: {err}");
            RosterColumns::default()
        }
    };
    if !columns.is_complete() {
        info!(
            "Roster header {header_line:?} lacks one of '{ID_COLUMN}', '{NAME_COLUMN}', '{BIRTHDAY_COLUMN}' using delimiter '{}'",
            io_utils::printable_delimiter(delimiter)
        );
    }

    let mut rejected = 0usize;
    for (offset, line) in lines.enumerate() {
        let line_number = offset + 2;
        if line.is_empty() {
            debug!("Skipping empty line {line_number}");
            continue;
        }

        let record = match io_utils::split_line(line, delimiter) {
            Ok(record) => record,
            Err(err) => {
                let error = RowError::Malformed(err.to_string());
                debug!("Line {line_number}: {error}");
                sink.report(error.diagnostic(line_number));
                rejected += 1;
                continue;
            }
        };

        match parse_person(&record, &columns) {
            Ok((id, person)) => {
                if let Some(previous) = table.insert(id, person) {
                    debug!(
                        "Line {line_number} replaced id {id} (previously '{}')",
                        previous.name
                    );
                }
            }
            Err(error) => {
                debug!("Line {line_number}: {error}");
                sink.report(error.diagnostic(line_number));
                rejected += 1;
            }
        }
    }

    info!(
        "Ingested {} person record(s), rejected {} row(s)",
        table.len(),
        rejected
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> RosterColumns {
        RosterColumns::from_headers(&csv::StringRecord::from(vec!["id", "name", "birthday"]))
    }

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn parse_birthday_requires_zero_padded_day_first() {
        assert_eq!(
            parse_birthday("23/07/2006"),
            NaiveDate::from_ymd_opt(2006, 7, 23)
        );
        assert_eq!(parse_birthday("3/07/2006"), None);
        assert_eq!(parse_birthday("23/7/2006"), None);
        assert_eq!(parse_birthday("2006/07/23"), None);
        assert_eq!(parse_birthday("23-07-2006"), None);
        assert_eq!(parse_birthday("29/072006"), None);
        assert_eq!(parse_birthday(" 23/07/2006"), None);
    }

    #[test]
    fn parse_birthday_rejects_impossible_dates() {
        assert_eq!(parse_birthday("32/01/2000"), None);
        assert_eq!(parse_birthday("23/23/2007"), None);
        assert_eq!(parse_birthday("31/02/1991"), None);
        assert_eq!(parse_birthday("29/02/2001"), None);
        assert!(parse_birthday("29/02/2000").is_some());
    }

    #[test]
    fn parse_row_tolerates_padding_and_sign_on_id() {
        let raw = parse_row(&record(&[" +12 ", "Dana", "01/01/2000"]), &columns()).unwrap();
        assert_eq!(raw.id, 12);
        assert_eq!(raw.raw_id, " +12 ");
    }

    #[test]
    fn parse_row_reports_missing_birthday_column() {
        let err = parse_row(&record(&["4", "Eve"]), &columns()).unwrap_err();
        assert_eq!(
            err,
            RowError::MissingColumn {
                column: BIRTHDAY_COLUMN,
                raw_id: Some("4".to_string()),
            }
        );
        assert_eq!(
            err.diagnostic(5),
            Diagnostic::general(5, Some("4".to_string()))
        );
    }

    #[test]
    fn every_row_error_carries_its_own_raw_id() {
        let no_id = RosterColumns {
            id: None,
            ..columns()
        };
        let err = parse_row(&record(&["4", "Eve", "01/01/2000"]), &no_id).unwrap_err();
        assert_eq!(err.raw_id(), None);
        assert_eq!(
            RowError::InvalidId("x".to_string()).diagnostic(2).raw_id.as_deref(),
            Some("x")
        );
        assert_eq!(RowError::Malformed("eof".to_string()).diagnostic(2).raw_id, None);
    }

    #[test]
    fn parse_person_checks_id_before_birthday() {
        let err = parse_person(&record(&["abc", "Eve", "bad"]), &columns()).unwrap_err();
        assert_eq!(err, RowError::InvalidId("abc".to_string()));

        let err = parse_person(&record(&["9", "Eve", "bad"]), &columns()).unwrap_err();
        assert!(matches!(err, RowError::InvalidBirthday { id: 9, .. }));
        assert_eq!(err.diagnostic(3), Diagnostic::birthday(3, "9", 9));
    }

    #[test]
    fn columns_are_matched_by_name() {
        let columns =
            RosterColumns::from_headers(&record(&["birthday", "extra", "id", "name"]));
        assert_eq!(columns.id, Some(2));
        assert_eq!(columns.name, Some(3));
        assert_eq!(columns.birthday, Some(0));
        assert!(columns.is_complete());
    }

    #[test]
    fn ingest_reports_every_row_when_header_lacks_a_column() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let table = ingest("id,name\n1,Alice\n2,Bob", b',', &mut diagnostics);
        assert!(table.is_empty());
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::General));
        assert_eq!(diagnostics[1].line, 3);
    }

    #[test]
    fn ingest_of_empty_text_is_empty() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        assert!(ingest("  \n\n", b',', &mut diagnostics).is_empty());
        assert!(diagnostics.is_empty());
    }
}
