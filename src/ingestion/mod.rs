//! Decoding and normalization of tabular roster documents.
//!
//! The pipeline for one document is:
//!
//! - [`unified::decode`]: bytes -> [`crate::types::RawRow`]s ([`csv`] or `excel`)
//! - [`resolve::resolve_fields`]: header aliases -> canonical fields
//! - [`validate::coerce`]: type coercion and the row acceptance gate
//!
//! [`crate::import::Importer`] sequences these stages and reports outcomes to an
//! [`ImportObserver`].

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod resolve;
pub mod unified;
pub mod validate;

pub use observability::{
    CompositeObserver, ImportContext, ImportObserver, ImportSeverity, ImportSource, ImportStage,
    ImportStats, TracingObserver,
};
pub use resolve::{resolve, resolve_fields, CanonicalField, ResolvedFields};
pub use unified::{decode, DocumentFormat, SHEETS_HOST, SPREADSHEET_CONTENT_TYPES};
pub use validate::{coerce, Rejection};
