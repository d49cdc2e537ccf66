//! Import orchestration.
//!
//! One import request moves through `Fetching -> Decoding -> Validating -> Persisting -> Done`
//! ([`ImportStage`]); any stage may fail the whole request. Uploads skip `Fetching`. Rows are
//! processed in document order into a local batch, and the batch is written with a single
//! [`RecordStore::insert_many`] call, so concurrent imports never share state here.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DecodeError, FetchError, ImportError, ImportResult};
use crate::fetch::{FetchOptions, Fetcher};
use crate::ingestion::{
    coerce, decode, resolve_fields, DocumentFormat, ImportContext, ImportObserver, ImportSeverity,
    ImportSource, ImportStage, ImportStats,
};
use crate::store::RecordStore;
use crate::types::{ImportRecord, NewRecord, OwnerId, RawRow};

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Remediation hint attached to download failures.
pub const PUBLIC_ACCESS_HINT: &str = "Make sure the URL is accessible and the file is publicly available. For Google Sheets, ensure the sheet is shared with \"Anyone with the link can view\" permission.";

/// Options controlling imports.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ImportOptions {
    /// Remote download behavior for URL imports.
    pub fetch: FetchOptions,
    /// Uploads larger than this are rejected before decoding.
    pub max_upload_bytes: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("fetch", &self.fetch)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

/// Successful import summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub message: String,
    pub count: usize,
    pub data: Vec<ImportRecord>,
}

/// Failed import summary.
///
/// `message` is user-facing guidance; `details` carries diagnostics or a remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Suggested HTTP status for the response.
    #[serde(skip)]
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl ImportFailure {
    /// Convert an error from an import of `source` into its response shape.
    pub fn from_error(err: &ImportError, source: &ImportSource) -> Self {
        let is_url = matches!(source, ImportSource::Url { .. });
        let processing = if is_url {
            "Error processing URL"
        } else {
            "Error processing file"
        };

        match err {
            ImportError::Input { message } => Self::new(400, message.clone(), None),
            ImportError::Fetch(e) => Self::new(
                400,
                format!("Failed to download file from URL: {e}"),
                Some(PUBLIC_ACCESS_HINT.to_string()),
            ),
            ImportError::Decode(DecodeError::EmptyDocument) => {
                let csv_hinted = match source {
                    ImportSource::Url { url } => {
                        DocumentFormat::from_url_hint(url) == Some(DocumentFormat::Csv)
                    }
                    ImportSource::Upload { .. } => false,
                };
                let message = if csv_hinted {
                    "CSV file is empty"
                } else {
                    "File is empty or invalid format"
                };
                Self::new(400, message.to_string(), None)
            }
            ImportError::Decode(e @ DecodeError::DecodeFailure { .. }) => {
                Self::new(500, processing.to_string(), Some(e.to_string()))
            }
            ImportError::NoValidRows => {
                let message = if is_url {
                    "No valid data found in the file"
                } else {
                    "No valid data found in Excel file"
                };
                Self::new(400, message.to_string(), None)
            }
            ImportError::Persistence(e) => Self::new(500, processing.to_string(), Some(e.to_string())),
        }
    }

    fn new(status: u16, message: String, details: Option<String>) -> Self {
        Self {
            status,
            message,
            details,
        }
    }
}

/// Response body for an import endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImportResponse {
    Success(ImportSummary),
    Failure(ImportFailure),
}

impl ImportResponse {
    /// Suggested HTTP status.
    pub fn status(&self) -> u16 {
        match self {
            ImportResponse::Success(_) => 200,
            ImportResponse::Failure(f) => f.status,
        }
    }

    /// JSON body for the response.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Runs import requests against a [`RecordStore`].
#[derive(Debug)]
pub struct Importer<S> {
    store: S,
    fetcher: Fetcher,
    options: ImportOptions,
}

impl<S: RecordStore> Importer<S> {
    /// Create an importer; builds the HTTP client used for URL imports.
    pub fn new(store: S, options: ImportOptions) -> ImportResult<Self> {
        let fetcher = Fetcher::new(options.fetch.clone())?;
        Ok(Self {
            store,
            fetcher,
            options,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Import an uploaded spreadsheet document owned by `owner`.
    ///
    /// `content_type` must be one of [`crate::ingestion::SPREADSHEET_CONTENT_TYPES`]; the bytes are
    /// decoded as a workbook without fallback.
    pub async fn import_file(
        &self,
        owner: &OwnerId,
        content_type: &str,
        bytes: &[u8],
    ) -> ImportResult<ImportSummary> {
        let source = ImportSource::Upload {
            content_type: content_type.to_owned(),
        };
        let mut stage = ImportStage::Decoding;
        let result = self.upload_pipeline(owner, content_type, bytes, &mut stage).await;
        self.finish(source, stage, result, "")
    }

    /// Download `url` and import it for `owner`.
    ///
    /// Sheets share links are rewritten to their CSV export. The decode strategy is chosen from the
    /// URL as given (see [`DocumentFormat::from_url_hint`]).
    pub async fn import_url(&self, owner: &OwnerId, url: &str) -> ImportResult<ImportSummary> {
        let source = ImportSource::Url {
            url: url.to_owned(),
        };
        let mut stage = ImportStage::Fetching;
        let result = self.url_pipeline(owner, url, &mut stage).await;
        self.finish(source, stage, result, " from URL")
    }

    /// [`Self::import_file`], converted to a response body.
    pub async fn respond_file(&self, owner: &OwnerId, content_type: &str, bytes: &[u8]) -> ImportResponse {
        let source = ImportSource::Upload {
            content_type: content_type.to_owned(),
        };
        into_response(self.import_file(owner, content_type, bytes).await, &source)
    }

    /// [`Self::import_url`], converted to a response body.
    pub async fn respond_url(&self, owner: &OwnerId, url: &str) -> ImportResponse {
        let source = ImportSource::Url {
            url: url.to_owned(),
        };
        into_response(self.import_url(owner, url).await, &source)
    }

    async fn upload_pipeline(
        &self,
        owner: &OwnerId,
        content_type: &str,
        bytes: &[u8],
        stage: &mut ImportStage,
    ) -> ImportResult<Outcome> {
        if bytes.is_empty() {
            return Err(ImportError::input("No file uploaded"));
        }
        let format = DocumentFormat::from_content_type(content_type)
            .ok_or_else(|| ImportError::input("Invalid file type. Only Excel files are allowed."))?;
        if bytes.len() > self.options.max_upload_bytes {
            return Err(ImportError::input(format!(
                "File too large. Maximum size is {} bytes",
                self.options.max_upload_bytes
            )));
        }

        let rows = decode(bytes, Some(format))?;
        self.validate_and_persist(owner, rows, stage).await
    }

    async fn url_pipeline(&self, owner: &OwnerId, url: &str, stage: &mut ImportStage) -> ImportResult<Outcome> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ImportError::input("Please provide a URL"));
        }

        let bytes = self.fetcher.fetch(url).await?;

        *stage = ImportStage::Decoding;
        let format = DocumentFormat::from_url_hint(url);
        debug!(?format, bytes = bytes.len(), "decoding downloaded document");
        let rows = decode(&bytes, format)?;
        self.validate_and_persist(owner, rows, stage).await
    }

    async fn validate_and_persist(
        &self,
        owner: &OwnerId,
        rows: Vec<RawRow>,
        stage: &mut ImportStage,
    ) -> ImportResult<Outcome> {
        *stage = ImportStage::Validating;
        let decoded_rows = rows.len();
        let mut batch: Vec<NewRecord> = Vec::with_capacity(decoded_rows);
        for (idx, row) in rows.iter().enumerate() {
            match coerce(&resolve_fields(row)) {
                Ok(fields) => batch.push(NewRecord {
                    owner: owner.clone(),
                    fields,
                }),
                Err(reason) => debug!(row = idx, %reason, "row dropped"),
            }
        }
        if batch.is_empty() {
            return Err(ImportError::NoValidRows);
        }

        let stats = ImportStats {
            decoded_rows,
            accepted_rows: batch.len(),
            rejected_rows: decoded_rows - batch.len(),
        };

        *stage = ImportStage::Persisting;
        let records = self.store.insert_many(batch).await?;
        *stage = ImportStage::Done;
        info!(owner = %owner, inserted = records.len(), rejected = stats.rejected_rows, "import persisted");

        Ok(Outcome { records, stats })
    }

    fn finish(
        &self,
        source: ImportSource,
        stage: ImportStage,
        result: ImportResult<Outcome>,
        suffix: &str,
    ) -> ImportResult<ImportSummary> {
        let ctx = ImportContext { source, stage };

        if let Some(obs) = self.options.observer.as_ref() {
            match &result {
                Ok(outcome) => obs.on_success(&ctx, outcome.stats),
                Err(e) => {
                    let sev = severity_for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result.map(|outcome| {
            let count = outcome.records.len();
            ImportSummary {
                message: format!("Successfully imported {count} record(s){suffix}"),
                count,
                data: outcome.records,
            }
        })
    }
}

struct Outcome {
    records: Vec<ImportRecord>,
    stats: ImportStats,
}

fn into_response(result: ImportResult<ImportSummary>, source: &ImportSource) -> ImportResponse {
    match result {
        Ok(summary) => ImportResponse::Success(summary),
        Err(e) => ImportResponse::Failure(ImportFailure::from_error(&e, source)),
    }
}

/// Severity used for observer callbacks.
pub fn severity_for_error(e: &ImportError) -> ImportSeverity {
    match e {
        ImportError::Input { .. } => ImportSeverity::Warning,
        ImportError::Fetch(FetchError::Network { .. } | FetchError::Timeout) => ImportSeverity::Critical,
        ImportError::Fetch(FetchError::InvalidUrl { .. }) => ImportSeverity::Warning,
        ImportError::Fetch(_) => ImportSeverity::Error,
        ImportError::Decode(_) => ImportSeverity::Error,
        ImportError::NoValidRows => ImportSeverity::Warning,
        ImportError::Persistence(_) => ImportSeverity::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::{severity_for_error, ImportFailure, ImportResponse, PUBLIC_ACCESS_HINT};
    use crate::error::{DecodeError, FetchError, ImportError, StoreError};
    use crate::ingestion::{ImportSeverity, ImportSource};

    fn url_source(url: &str) -> ImportSource {
        ImportSource::Url { url: url.to_string() }
    }

    fn upload_source() -> ImportSource {
        ImportSource::Upload {
            content_type: "application/vnd.ms-excel".to_string(),
        }
    }

    #[test]
    fn fetch_failures_carry_public_access_hint() {
        let err = ImportError::Fetch(FetchError::HttpStatus {
            status: 403,
            reason: "Forbidden".to_string(),
        });
        let failure = ImportFailure::from_error(&err, &url_source("https://example.com/a.csv"));
        assert_eq!(failure.status, 400);
        assert_eq!(
            failure.message,
            "Failed to download file from URL: Failed to download file: HTTP 403 Forbidden"
        );
        assert_eq!(failure.details.as_deref(), Some(PUBLIC_ACCESS_HINT));
    }

    #[test]
    fn no_valid_rows_is_distinct_from_decode_failure() {
        let none = ImportFailure::from_error(&ImportError::NoValidRows, &upload_source());
        assert_eq!(none.status, 400);
        assert_eq!(none.message, "No valid data found in Excel file");

        let bad = ImportError::Decode(DecodeError::DecodeFailure {
            message: "zip error".to_string(),
        });
        let failure = ImportFailure::from_error(&bad, &upload_source());
        assert_eq!(failure.status, 500);
        assert_eq!(failure.message, "Error processing file");
        assert!(failure.details.unwrap().contains("zip error"));
    }

    #[test]
    fn empty_document_message_depends_on_url_hint() {
        let err = ImportError::Decode(DecodeError::EmptyDocument);
        let csv = ImportFailure::from_error(&err, &url_source("https://example.com/a.csv"));
        assert_eq!(csv.message, "CSV file is empty");
        let sniffed = ImportFailure::from_error(&err, &url_source("https://example.com/dl/1"));
        assert_eq!(sniffed.message, "File is empty or invalid format");
    }

    #[test]
    fn failure_serializes_without_status() {
        let failure = ImportFailure::from_error(&ImportError::NoValidRows, &url_source("https://x.test/f"));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "No valid data found in the file" }));

        let body = ImportResponse::Failure(failure).to_json().unwrap();
        assert_eq!(body, r#"{"message":"No valid data found in the file"}"#);
    }

    #[test]
    fn severities() {
        assert_eq!(severity_for_error(&ImportError::Fetch(FetchError::Timeout)), ImportSeverity::Critical);
        assert_eq!(
            severity_for_error(&ImportError::Persistence(StoreError::new("down"))),
            ImportSeverity::Critical
        );
        assert_eq!(severity_for_error(&ImportError::NoValidRows), ImportSeverity::Warning);
        assert_eq!(
            severity_for_error(&ImportError::Fetch(FetchError::TooManyRedirects { limit: 5 })),
            ImportSeverity::Error
        );
    }
}
