//! `roster-import` turns loosely formatted spreadsheets into validated talent profile records.
//!
//! The primary entrypoint is [`import::Importer`], which accepts either an uploaded workbook
//! ([`import::Importer::import_file`]) or a URL ([`import::Importer::import_url`]) and writes the
//! accepted rows to a [`store::RecordStore`] in one batch.
//!
//! ## What gets imported
//!
//! **Sources:**
//!
//! - **Uploads**: `.xlsx` / `.xls` bytes declared with a spreadsheet content type
//! - **URLs**: CSV or workbook files over HTTP(S); Google Sheets share links are rewritten to the
//!   sheet's CSV export
//!
//! **Schema:** every row is normalized into [`types::CanonicalFields`]. Headers are matched through
//! per-field alias lists (`Full Name`, `Contact_No`, `WhatsApp Number`, ...), first exactly and
//! then ignoring case, whitespace, `-` and `_`.
//!
//! **Validation:** rows without a name, gender, city or state are dropped. Bad numbers degrade to
//! `0`, and non-empty gender values other than `Male`/`Female`/`Other` become `Other`. An import where every
//! row was dropped fails with [`ImportError::NoValidRows`].
//!
//! ## Quick example
//!
//! ```no_run
//! use roster_import::import::{ImportOptions, Importer};
//! use roster_import::store::InMemoryStore;
//! use roster_import::types::OwnerId;
//!
//! # async fn run() -> Result<(), roster_import::ImportError> {
//! let importer = Importer::new(InMemoryStore::new(), ImportOptions::default())?;
//! let owner = OwnerId::new("user-42");
//!
//! let summary = importer
//!     .import_url(&owner, "https://docs.google.com/spreadsheets/d/ABC123/edit#gid=0")
//!     .await?;
//! println!("{} ({} rows)", summary.message, summary.count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`import`]: orchestration and response summaries
//! - [`ingestion`]: decoding, header resolution, validation, observer hooks
//! - [`fetch`]: remote download with redirect handling
//! - [`store`]: persistence boundary
//! - [`processing`]: record filtering
//! - [`export`]: CSV/XLSX export
//! - [`types`]: data model
//! - [`error`]: error types

pub mod error;
pub mod export;
pub mod fetch;
pub mod import;
pub mod ingestion;
pub mod processing;
pub mod store;
pub mod types;

pub use error::{DecodeError, FetchError, ImportError, ImportResult, StoreError};
