//! Export of persisted records to CSV and XLSX.
//!
//! Exported headers are spellings the importer resolves, so an exported file can be imported
//! again unchanged.

use chrono::NaiveDate;

use crate::error::ExportError;
use crate::types::{CanonicalFields, ImportRecord};

/// Column headers of an export, in order.
pub const EXPORT_HEADERS: [&str; 11] = [
    "Name",
    "Instagram URL",
    "Followers",
    "Average View",
    "ER (%)",
    "Language",
    "Gender",
    "State",
    "City",
    "Contact No",
    "Commercial",
];

fn text_columns(f: &CanonicalFields) -> [String; 11] {
    [
        f.name.clone(),
        f.instagramurl.clone(),
        f.followers.to_string(),
        f.average_view.to_string(),
        f.er.to_string(),
        f.language.clone(),
        f.gender.to_string(),
        f.state.clone(),
        f.city.clone(),
        f.contactno.clone(),
        f.commercial.clone(),
    ]
}

/// Write `fields` as CSV with [`EXPORT_HEADERS`].
pub fn write_csv<'a, I>(fields: I) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = &'a CanonicalFields>,
{
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(EXPORT_HEADERS)?;
    for f in fields {
        wtr.write_record(text_columns(f))?;
    }
    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Write persisted records as CSV. See [`write_csv`].
pub fn write_records_csv(records: &[ImportRecord]) -> Result<Vec<u8>, ExportError> {
    write_csv(records.iter().map(|r| &r.fields))
}

/// Write persisted records as a single-sheet (`Data`) XLSX workbook.
///
/// Followers, average view and ER are written as numbers.
#[cfg(feature = "excel")]
pub fn write_records_xlsx(records: &[ImportRecord]) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Data")?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        ws.write_string(0, col as u16, *header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        let f = &record.fields;
        ws.write_string(row, 0, &f.name)?;
        ws.write_string(row, 1, &f.instagramurl)?;
        ws.write_number(row, 2, f.followers as f64)?;
        ws.write_number(row, 3, f.average_view as f64)?;
        ws.write_number(row, 4, f.er)?;
        ws.write_string(row, 5, &f.language)?;
        ws.write_string(row, 6, f.gender.as_str())?;
        ws.write_string(row, 7, &f.state)?;
        ws.write_string(row, 8, &f.city)?;
        ws.write_string(row, 9, &f.contactno)?;
        ws.write_string(row, 10, &f.commercial)?;
    }

    Ok(wb.save_to_buffer()?)
}

/// File name for an export: `{prefix}-{YYYY-MM-DD}.xlsx`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.xlsx", date.format("%Y-%m-%d"))
}
