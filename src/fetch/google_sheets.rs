//! Google Sheets share-link rewriting.
//!
//! A sheet opened in the browser lives at `https://docs.google.com/spreadsheets/d/<id>/edit#gid=<tab>`.
//! The same tab is downloadable as CSV from the `export` endpoint, provided the sheet is shared
//! with "Anyone with the link".

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::ingestion::SHEETS_HOST;

static DOCUMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("document id pattern should be valid")
});

static TAB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gid=(\d+)").expect("gid pattern should be valid"));

/// Rewrite a Sheets document URL to its CSV export URL.
///
/// The tab id comes from a `gid=<digits>` fragment and defaults to `0`. Any URL that is not a
/// Sheets document link (or does not parse) is returned unchanged.
///
/// ```
/// use roster_import::fetch::google_sheets::rewrite_sheets_url;
///
/// assert_eq!(
///     rewrite_sheets_url("https://docs.google.com/spreadsheets/d/ABC123/edit#gid=42"),
///     "https://docs.google.com/spreadsheets/d/ABC123/export?format=csv&gid=42",
/// );
/// ```
pub fn rewrite_sheets_url(url: &str) -> String {
    sheets_export_url(url).unwrap_or_else(|| url.to_owned())
}

fn sheets_export_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if !host.contains(SHEETS_HOST) || !parsed.path().contains("/spreadsheets/") {
        return None;
    }

    let document_id = DOCUMENT_ID.captures(parsed.path())?.get(1)?.as_str();
    let tab_id = parsed
        .fragment()
        .and_then(|fragment| TAB_ID.captures(fragment))
        .and_then(|caps| caps.get(1))
        .map_or("0", |m| m.as_str());

    Some(format!(
        "https://{SHEETS_HOST}/spreadsheets/d/{document_id}/export?format=csv&gid={tab_id}"
    ))
}
