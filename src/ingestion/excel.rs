#![cfg(feature = "excel")]

//! Workbook (`.xlsx`, `.xls`, `.xlsb`, `.ods`) decoding.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::DecodeError;
use crate::types::{CellValue, RawRow};

/// Decode the first sheet of an in-memory workbook into rows.
///
/// Behavior:
/// - Only the first sheet in workbook order is read
/// - The first non-empty row is the header row; blank headers become `__EMPTY`, `__EMPTY_1`, ...
///   and repeated headers get `_1`, `_2`, ... suffixes
/// - Blank cells are omitted from a row; rows with no non-blank cell are skipped
///
/// The container format is sniffed from the bytes.
pub fn decode_workbook(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DecodeError::DecodeFailure {
            message: "workbook has no sheets".to_string(),
        })?;
    let range = workbook.worksheet_range(&first)?;

    Ok(sheet_rows(&range))
}

fn sheet_rows(range: &calamine::Range<Data>) -> Vec<RawRow> {
    let mut rows_iter = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let Some(header_cells) = rows_iter.next() else {
        return Vec::new();
    };
    let headers = header_keys(header_cells);

    let mut rows = Vec::new();
    for cells in rows_iter {
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            if let Some(value) = convert_cell(cell) {
                row.insert(header.clone(), value);
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    rows
}

fn header_keys(cells: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut keys = Vec::with_capacity(cells.len());

    for cell in cells {
        let text = cell_to_header_string(cell);
        let base = if text.is_empty() { "__EMPTY".to_string() } else { text };
        let count = seen.entry(base.clone()).or_insert(0);
        let key = if *count == 0 {
            base
        } else {
            format!("{base}_{count}")
        };
        *count += 1;
        keys.push(key);
    }
    keys
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Option<CellValue> {
    match c {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Int(*i)),
        Data::Float(f) => Some(CellValue::Float(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        // Date cells keep their serial number.
        Data::DateTime(dt) => Some(CellValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_workbook, header_keys};
    use crate::error::DecodeError;
    use calamine::Data;

    #[test]
    fn header_keys_fill_blanks_and_suffix_duplicates() {
        let cells = vec![
            Data::String("Name".to_string()),
            Data::Empty,
            Data::String("Name".to_string()),
            Data::Empty,
            Data::Float(2024.0),
        ];
        assert_eq!(
            header_keys(&cells),
            vec!["Name", "__EMPTY", "Name_1", "__EMPTY_1", "2024"]
        );
    }

    #[test]
    fn non_workbook_bytes_fail_to_decode() {
        let err = decode_workbook(b"Name,City\nAsha,Pune\n").unwrap_err();
        assert!(matches!(err, DecodeError::DecodeFailure { .. }));
    }
}
