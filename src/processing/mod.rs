//! In-memory operations over persisted records.
//!
//! Currently implemented:
//!
//! - [`filter_records()`]: the roster view's column filters
//!
//! ## Example
//!
//! ```rust
//! use roster_import::processing::{filter_records, RecordFilter};
//!
//! let filter = RecordFilter {
//!     city: "pun".to_string(),
//!     followers: "10000".to_string(),
//!     ..Default::default()
//! };
//! let visible = filter_records(&[], &filter);
//! assert!(visible.is_empty());
//! ```

pub mod filter;

pub use filter::{filter_records, RecordFilter};
