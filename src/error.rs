use thiserror::Error;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error type returned by the import orchestrator.
///
/// Each variant corresponds to one stage of an import request; callers usually convert it into an
/// [`crate::import::ImportFailure`] via [`crate::import::ImportFailure::from_error`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The request was rejected before any I/O (missing file/URL, disallowed content type, ...).
    #[error("{message}")]
    Input { message: String },

    /// Downloading the source document failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The document could not be turned into rows.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The document was readable but no row passed validation.
    #[error("no valid rows found in the document")]
    NoValidRows,

    /// The bulk insert failed; nothing from this batch should be considered committed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl ImportError {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}

/// Failures of the remote fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed (or uses an unsupported scheme).
    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    /// Connection, TLS or body transfer failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The whole download (including redirects) exceeded the configured timeout.
    #[error("Request timeout")]
    Timeout,

    /// More redirect hops than allowed.
    #[error("Too many redirects")]
    TooManyRedirects { limit: usize },

    /// The response body exceeded the configured size limit.
    #[error("Response body too large (limit {limit} bytes)")]
    BodyTooLarge { limit: usize },

    /// Any final status other than `200` (and unfollowable `3xx`).
    #[error("Failed to download file: HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Failures turning raw bytes into [`crate::types::RawRow`]s.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No non-blank lines remained after filtering.
    #[error("document is empty")]
    EmptyDocument,

    /// Bytes could not be read as a workbook (and no fallback applied).
    #[error("failed to decode document: {message}")]
    DecodeFailure { message: String },
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for DecodeError {
    fn from(err: calamine::Error) -> Self {
        Self::DecodeFailure {
            message: err.to_string(),
        }
    }
}

/// Error surfaced by a [`crate::store::RecordStore`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error type returned by the export writers.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Underlying I/O error while flushing the output buffer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// XLSX serialization error (feature-gated behind `excel`).
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
