//! Core data model types for roster imports.
//!
//! Decoders produce [`RawRow`]s keyed by the original header text. The resolver and validator turn
//! each row into [`CanonicalFields`], which the orchestrator tags with an [`OwnerId`] and hands to
//! the store as [`NewRecord`]s. The store answers with persisted [`ImportRecord`]s.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single scalar cell as produced by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text cell (all delimited-text cells are text).
    Text(String),
    /// Whole-number workbook cell.
    Int(i64),
    /// Floating point workbook cell (also used for date serials).
    Float(f64),
    /// Boolean workbook cell.
    Bool(bool),
}

impl CellValue {
    /// Render the cell as text, the way the resolver compares and returns it.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One decoded source record, keyed by header text exactly as it appears in the document.
///
/// Keys keep first-insertion order. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((key, value)),
        }
    }

    /// Look up a value by exact key.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no keys.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Gender of a talent profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Exact (case-sensitive) match against `Male`, `Female`, `Other`.
    pub fn parse_exact(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Canonical label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed schema every imported row is normalized into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFields {
    pub name: String,
    #[serde(default)]
    pub instagramurl: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(rename = "averageView", default)]
    pub average_view: u64,
    /// Engagement rate in percent, `0..=100`.
    #[serde(default)]
    pub er: f64,
    #[serde(default)]
    pub language: String,
    pub gender: Gender,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub contactno: String,
    #[serde(default)]
    pub commercial: String,
}

/// Opaque identifier of the user who owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated row tagged with its owner, ready for bulk insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(rename = "userId")]
    pub owner: OwnerId,
    #[serde(flatten)]
    pub fields: CanonicalFields,
}

/// A persisted record as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner: OwnerId,
    #[serde(flatten)]
    pub fields: CanonicalFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form input for a single manually entered record.
///
/// Every field arrives as free text; see [`CanonicalFields::from_manual_entry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualEntry {
    pub name: String,
    pub instagramurl: String,
    pub followers: String,
    #[serde(rename = "averageView")]
    pub average_view: String,
    pub er: String,
    pub language: String,
    pub gender: String,
    pub state: String,
    pub city: String,
    pub contactno: String,
    pub commercial: String,
}
