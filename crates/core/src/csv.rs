//! Strict CSV import/export adapter for activity records.
//!
//! The import grammar is deliberately narrow: a fixed header, eight columns,
//! RFC-4180-style quoting (doubled quotes inside quoted fields), and `\n` or
//! `\r\n` line endings. Anything else is rejected with its row number.
//! Malformed rows are never guessed at -- a rejected row can be fixed and
//! re-imported, a silently mis-parsed date cannot.

use serde::Serialize;

use crate::activity::ActivityDraft;

/// Expected header line, also emitted by [`to_csv`].
pub const CSV_HEADER: &str =
    "date,start_time,end_time,title,category,work_mode,location,description";

/// Number of columns in the grammar.
const COLUMN_COUNT: usize = 8;

/// A rejected CSV row. `row` is the 1-based line number in the file,
/// counting the header as line 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

/// Parse an activity CSV into drafts for the given author.
///
/// The result still has to pass the schema validator; this function only
/// enforces the file grammar (header, column count, quoting). All row
/// errors are collected so the caller can report the whole file at once.
pub fn parse_csv(text: &str, author: &str) -> Result<Vec<ActivityDraft>, Vec<RowError>> {
    let mut lines = text.lines();

    let header = match lines.next() {
        Some(h) => h.trim_end_matches('\r'),
        None => return Err(vec![RowError::new(1, "file is empty")]),
    };
    if header != CSV_HEADER {
        return Err(vec![RowError::new(
            1,
            format!("header must be exactly: {CSV_HEADER}"),
        )]);
    }

    let mut drafts = Vec::new();
    let mut errors = Vec::new();

    for (i, line) in lines.enumerate() {
        let row = i + 2;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            // A trailing newline is fine; interior blank lines are too.
            continue;
        }

        let fields = match parse_line(line) {
            Ok(fields) => fields,
            Err(message) => {
                errors.push(RowError::new(row, message));
                continue;
            }
        };

        if fields.len() != COLUMN_COUNT {
            errors.push(RowError::new(
                row,
                format!("expected {COLUMN_COUNT} columns, found {}", fields.len()),
            ));
            continue;
        }

        let [date, start_time, end_time, title, category, work_mode, location, description]: [String; COLUMN_COUNT] =
            fields.try_into().expect("column count checked");
        drafts.push(ActivityDraft {
            author: Some(author.to_string()),
            date: Some(date),
            title: Some(title),
            category: Some(category),
            start_time: Some(start_time),
            end_time: Some(end_time),
            work_mode: Some(work_mode),
            location: Some(location),
            description: Some(description).filter(|d| !d.is_empty()),
            proof: None,
        });
    }

    if errors.is_empty() {
        Ok(drafts)
    } else {
        Err(errors)
    }
}

/// Render rows (already formatted as the eight grammar columns) to CSV.
pub fn to_csv<I>(rows: I) -> String
where
    I: IntoIterator<Item = [String; COLUMN_COUNT]>,
{
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in rows {
        let line: Vec<String> = row.iter().map(|f| quote_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field when it contains a comma, quote, or newline.
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one line into fields.
///
/// Quotes are only meaningful at the start of a field; a doubled quote
/// inside a quoted field is a literal quote. An unterminated quote or any
/// character between a closing quote and the next comma is an error.
fn parse_line(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    loop {
        match chars.peek() {
            Some('"') => {
                chars.next();
                // Quoted field: scan to the closing quote.
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            current.push('"');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        current.push(c);
                    }
                }
                if !closed {
                    return Err("unterminated quoted field".into());
                }
                match chars.next() {
                    None => {
                        fields.push(std::mem::take(&mut current));
                        return Ok(fields);
                    }
                    Some(',') => fields.push(std::mem::take(&mut current)),
                    Some(c) => {
                        return Err(format!("unexpected '{c}' after closing quote"));
                    }
                }
            }
            _ => {
                // Unquoted field: scan to the next comma. A quote inside an
                // unquoted field is malformed.
                loop {
                    match chars.next() {
                        None => {
                            fields.push(std::mem::take(&mut current));
                            return Ok(fields);
                        }
                        Some(',') => {
                            fields.push(std::mem::take(&mut current));
                            break;
                        }
                        Some('"') => {
                            return Err("quote inside unquoted field".into());
                        }
                        Some(c) => current.push(c),
                    }
                }
            }
        }
    }
}
