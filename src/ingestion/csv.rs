//! Delimited-text (CSV) decoding.
//!
//! The document is split into lines first, so quoted fields cannot span lines. Within a line,
//! double quotes toggle a quoted span, `""` inside a span is a literal quote, and commas inside a
//! span do not split the field.

use crate::error::DecodeError;
use crate::types::RawRow;

const UTF8_BOM: char = '\u{feff}';

/// Decode CSV bytes into rows keyed by the header line.
///
/// Rules:
///
/// - Lines are split on `\n` or `\r\n`; whitespace-only lines are discarded.
/// - The first remaining line is the header.
/// - A data line shorter than the header fills the missing columns with `""`; extra columns are
///   ignored.
///
/// Returns [`DecodeError::EmptyDocument`] if no line remains after filtering.
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&*text);
    decode_csv_str(text)
}

/// Decode CSV from an in-memory string. See [`decode_csv`].
pub fn decode_csv_str(text: &str) -> Result<Vec<RawRow>, DecodeError> {
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or(DecodeError::EmptyDocument)?;
    let headers: Vec<String> = parse_line(header_line).into_iter().map(clean_field).collect();

    let mut rows = Vec::new();
    for line in lines {
        let mut values = parse_line(line).into_iter().map(clean_field);
        let mut row = RawRow::new();
        for header in &headers {
            row.insert(header.clone(), values.next().unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Split one line into trimmed fields, honoring double-quoted spans.
///
/// ```
/// use roster_import::ingestion::csv::parse_line;
///
/// assert_eq!(parse_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
/// assert_eq!(parse_line(r#"a,"b""c",d"#), vec!["a", "b\"c", "d"]);
/// ```
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_owned());
    fields
}

// Drop one stray leading/trailing quote left over from unbalanced quoting.
fn clean_field(field: String) -> String {
    let s = field.strip_prefix('"').unwrap_or(&field);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.trim().to_owned()
}
