//! Record filtering for the roster view.

use serde::{Deserialize, Serialize};

use crate::ingestion::validate::{parse_leading_float, parse_leading_int};
use crate::types::ImportRecord;

/// Column filters; empty strings are ignored.
///
/// - Text columns match by case-insensitive substring.
/// - `gender` matches case-insensitively but exactly.
/// - `followers`, `average_view` and `er` are minimums. A value that does not parse as a number
///   disables that filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
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

impl RecordFilter {
    /// Returns `true` if `record` passes every non-empty filter.
    pub fn matches(&self, record: &ImportRecord) -> bool {
        let f = &record.fields;

        let text_filters = [
            (&self.name, &f.name),
            (&self.instagramurl, &f.instagramurl),
            (&self.language, &f.language),
            (&self.state, &f.state),
            (&self.city, &f.city),
            (&self.contactno, &f.contactno),
            (&self.commercial, &f.commercial),
        ];
        if !text_filters
            .iter()
            .all(|(needle, haystack)| contains_ignore_case(haystack, needle))
        {
            return false;
        }

        if !self.gender.is_empty() && !f.gender.as_str().eq_ignore_ascii_case(&self.gender) {
            return false;
        }

        if let Some(min) = parse_leading_int(&self.followers) {
            if (f.followers as i128) < i128::from(min) {
                return false;
            }
        }
        if let Some(min) = parse_leading_int(&self.average_view) {
            if (f.average_view as i128) < i128::from(min) {
                return false;
            }
        }
        if let Some(min) = parse_leading_float(&self.er) {
            if f.er < min {
                return false;
            }
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Returns the records passing `filter`, in their original order.
pub fn filter_records(records: &[ImportRecord], filter: &RecordFilter) -> Vec<ImportRecord> {
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_records, RecordFilter};
    use crate::types::{CanonicalFields, Gender, ImportRecord, OwnerId};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(name: &str, gender: Gender, city: &str, followers: u64, er: f64) -> ImportRecord {
        let now = Utc::now();
        ImportRecord {
            id: Uuid::new_v4(),
            owner: OwnerId::new("u1"),
            fields: CanonicalFields {
                name: name.to_string(),
                instagramurl: format!("https://instagram.com/{}", name.to_lowercase()),
                followers,
                average_view: followers / 10,
                er,
                language: "Hindi".to_string(),
                gender,
                state: "MH".to_string(),
                city: city.to_string(),
                contactno: String::new(),
                commercial: String::new(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<ImportRecord> {
        vec![
            record("Asha", Gender::Female, "Pune", 12_000, 4.5),
            record("Ravi", Gender::Male, "Mumbai", 800, 9.0),
            record("Kiran", Gender::Other, "Pune", 50_000, 1.2),
        ]
    }

    fn names(records: &[ImportRecord]) -> Vec<&str> {
        records.iter().map(|r| r.fields.name.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let out = filter_records(&sample(), &RecordFilter::default());
        assert_eq!(names(&out), vec!["Asha", "Ravi", "Kiran"]);
    }

    #[test]
    fn text_filters_are_case_insensitive_substrings() {
        let filter = RecordFilter {
            city: "PUN".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&filter_records(&sample(), &filter)), vec!["Asha", "Kiran"]);
    }

    #[test]
    fn gender_is_exact_ignoring_case() {
        let filter = RecordFilter {
            gender: "male".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&filter_records(&sample(), &filter)), vec!["Ravi"]);
    }

    #[test]
    fn numeric_filters_are_minimums() {
        let filter = RecordFilter {
            followers: "10000".to_string(),
            er: "2".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&filter_records(&sample(), &filter)), vec!["Asha"]);
    }

    #[test]
    fn unparseable_numeric_filter_is_ignored() {
        let filter = RecordFilter {
            followers: "lots".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_records(&sample(), &filter).len(), 3);
    }
}
