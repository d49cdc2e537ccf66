//! Format selection and decode dispatch.
//!
//! Callers either know the document format up front (uploads declare a spreadsheet content type;
//! URLs often carry `.csv`/`.xlsx` hints) or they don't, in which case [`decode`] tries the
//! workbook decoder first and falls back to CSV. Workbook parsing fails loudly on text input, while
//! CSV parsing accepts almost anything, so the order matters.

use tracing::debug;

use crate::error::DecodeError;
use crate::types::RawRow;

use super::csv;

/// Content types accepted for direct uploads.
pub const SPREADSHEET_CONTENT_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

/// Host whose share links are rewritten to CSV exports (and always decoded as CSV).
pub const SHEETS_HOST: &str = "docs.google.com";

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet workbook (feature-gated behind `excel`).
    Workbook,
}

impl DocumentFormat {
    /// Format declared by an upload's content type, if it is one of
    /// [`SPREADSHEET_CONTENT_TYPES`].
    ///
    /// Parameters such as `; charset=...` are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        SPREADSHEET_CONTENT_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
            .then_some(Self::Workbook)
    }

    /// Guess the format from the textual hints in a URL (case-insensitive).
    ///
    /// - `.csv`, `format=csv` or the Sheets host: [`DocumentFormat::Csv`]
    /// - `.xlsx` / `.xls`: [`DocumentFormat::Workbook`]
    /// - otherwise `None` (sniff on decode)
    pub fn from_url_hint(url: &str) -> Option<Self> {
        let lower = url.to_ascii_lowercase();
        if lower.contains(".csv") || lower.contains("format=csv") || lower.contains(SHEETS_HOST) {
            Some(Self::Csv)
        } else if lower.contains(".xlsx") || lower.contains(".xls") {
            Some(Self::Workbook)
        } else {
            None
        }
    }
}

/// Decode `bytes` into rows.
///
/// With `Some(format)` only that decoder runs. With `None`, the workbook decoder is attempted
/// first and any failure falls back to CSV.
pub fn decode(bytes: &[u8], format: Option<DocumentFormat>) -> Result<Vec<RawRow>, DecodeError> {
    match format {
        Some(DocumentFormat::Csv) => csv::decode_csv(bytes),
        Some(DocumentFormat::Workbook) => decode_workbook_dispatch(bytes),
        None => match decode_workbook_dispatch(bytes) {
            Ok(rows) => Ok(rows),
            Err(err) => {
                debug!(error = %err, "workbook decode failed; falling back to csv");
                csv::decode_csv(bytes)
            }
        },
    }
}

fn decode_workbook_dispatch(bytes: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    #[cfg(feature = "excel")]
    {
        super::excel::decode_workbook(bytes)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = bytes;
        Err(DecodeError::DecodeFailure {
            message: "excel support not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}
