//! Row validation and type coercion.
//!
//! Numeric fields degrade to `0` on bad input instead of failing the row. A row is only rejected
//! when one of the required fields (name, gender, city, state) is empty after resolution.

use std::fmt;

use crate::error::ImportError;
use crate::types::{CanonicalFields, Gender, ManualEntry};

use super::resolve::ResolvedFields;

/// Why a row was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingName,
    MissingGender,
    MissingCity,
    MissingState,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self {
            Rejection::MissingName => "name",
            Rejection::MissingGender => "gender",
            Rejection::MissingCity => "city",
            Rejection::MissingState => "state",
        };
        write!(f, "missing required field '{field}'")
    }
}

/// Coerce resolved text fields into [`CanonicalFields`].
///
/// - `followers`, `averageView`: leading integer, kept only if `>= 0`, else `0`
/// - `er`: leading float, kept only if within `0..=100`, else `0`
/// - `gender`: exact `Male`/`Female`/`Other`, any other non-empty value becomes `Other`
///
/// The required-field gate runs on the resolved text, so an empty gender rejects the row before
/// the `Other` substitution applies.
pub fn coerce(fields: &ResolvedFields) -> Result<CanonicalFields, Rejection> {
    if fields.name.is_empty() {
        return Err(Rejection::MissingName);
    }
    if fields.gender.is_empty() {
        return Err(Rejection::MissingGender);
    }
    if fields.city.is_empty() {
        return Err(Rejection::MissingCity);
    }
    if fields.state.is_empty() {
        return Err(Rejection::MissingState);
    }

    Ok(CanonicalFields {
        name: fields.name.clone(),
        instagramurl: fields.instagramurl.clone(),
        followers: coerce_count(&fields.followers),
        average_view: coerce_count(&fields.average_view),
        er: coerce_rate(&fields.er),
        language: fields.language.clone(),
        gender: Gender::parse_exact(&fields.gender).unwrap_or(Gender::Other),
        state: fields.state.clone(),
        city: fields.city.clone(),
        contactno: fields.contactno.clone(),
        commercial: fields.commercial.clone(),
    })
}

fn coerce_count(raw: &str) -> u64 {
    parse_leading_int(raw)
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(0)
}

fn coerce_rate(raw: &str) -> f64 {
    match parse_leading_float(raw) {
        Some(v) if (0.0..=100.0).contains(&v) => v,
        _ => 0.0,
    }
}

/// Parse the longest leading integer prefix (`"1000.7"` -> `1000`, `"12k"` -> `12`).
///
/// Leading whitespace and a single sign are allowed. Returns `None` when no digit follows, or when
/// the value does not fit an `i64`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Parse the longest leading decimal prefix (`"3.5%"` -> `3.5`, `"1e2x"` -> `100.0`).
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(s.starts_with(['+', '-']));

    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

impl CanonicalFields {
    /// Validate a manually entered record.
    ///
    /// Unlike imports, a manual entry with a missing name, gender, city or state is an error, and
    /// gender must be one of the enum labels. Numeric fields that do not parse become `0`, but a
    /// parsed count below `0` or a rate outside `0..=100` is an error.
    pub fn from_manual_entry(entry: &ManualEntry) -> Result<Self, ImportError> {
        let required = [&entry.name, &entry.gender, &entry.city, &entry.state];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(ImportError::input(
                "Name, gender, city, and state are required fields",
            ));
        }
        let gender = Gender::parse_exact(entry.gender.trim()).ok_or_else(|| {
            ImportError::input(format!(
                "Invalid gender '{}'. Expected Male, Female or Other",
                entry.gender.trim()
            ))
        })?;

        Ok(Self {
            name: entry.name.trim().to_owned(),
            instagramurl: entry.instagramurl.trim().to_owned(),
            followers: manual_count("followers", &entry.followers)?,
            average_view: manual_count("averageView", &entry.average_view)?,
            er: manual_rate(&entry.er)?,
            language: entry.language.trim().to_owned(),
            gender,
            state: entry.state.trim().to_owned(),
            city: entry.city.trim().to_owned(),
            contactno: entry.contactno.trim().to_owned(),
            commercial: entry.commercial.trim().to_owned(),
        })
    }
}

// Manual entries keep the parsed value and reject it when out of range.
fn manual_count(field: &str, raw: &str) -> Result<u64, ImportError> {
    match parse_leading_int(raw) {
        None => Ok(0),
        Some(v) => u64::try_from(v)
            .map_err(|_| ImportError::input(format!("{field} must be greater than or equal to 0"))),
    }
}

fn manual_rate(raw: &str) -> Result<f64, ImportError> {
    match parse_leading_float(raw) {
        None => Ok(0.0),
        Some(v) if (0.0..=100.0).contains(&v) => Ok(v),
        Some(_) => Err(ImportError::input("er must be between 0 and 100")),
    }
}

#[cfg(test)]
mod tests {
    use super::{coerce, parse_leading_float, parse_leading_int, Rejection};
    use crate::ingestion::resolve::ResolvedFields;
    use crate::types::{CanonicalFields, Gender, ManualEntry};

    fn valid_fields() -> ResolvedFields {
        ResolvedFields {
            name: "Asha".to_string(),
            gender: "Female".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn er_out_of_range_becomes_zero() {
        let mut f = valid_fields();
        f.er = "150".to_string();
        assert_eq!(coerce(&f).unwrap().er, 0.0);

        f.er = "42.5".to_string();
        assert_eq!(coerce(&f).unwrap().er, 42.5);

        f.er = "-0.5".to_string();
        assert_eq!(coerce(&f).unwrap().er, 0.0);
    }

    #[test]
    fn negative_followers_become_zero() {
        let mut f = valid_fields();
        f.followers = "-3".to_string();
        assert_eq!(coerce(&f).unwrap().followers, 0);

        f.followers = "1000".to_string();
        assert_eq!(coerce(&f).unwrap().followers, 1000);

        f.average_view = "n/a".to_string();
        assert_eq!(coerce(&f).unwrap().average_view, 0);
    }

    #[test]
    fn gender_is_exact_match_only() {
        let mut f = valid_fields();
        f.gender = "male".to_string();
        assert_eq!(coerce(&f).unwrap().gender, Gender::Other);

        f.gender = "Unknown".to_string();
        assert_eq!(coerce(&f).unwrap().gender, Gender::Other);

        f.gender = "Male".to_string();
        assert_eq!(coerce(&f).unwrap().gender, Gender::Male);
    }

    #[test]
    fn missing_city_rejects_row() {
        let mut f = valid_fields();
        f.city = String::new();
        assert_eq!(coerce(&f), Err(Rejection::MissingCity));

        let mut f = valid_fields();
        f.name = String::new();
        assert_eq!(coerce(&f), Err(Rejection::MissingName));

        let mut f = valid_fields();
        f.state = String::new();
        assert_eq!(coerce(&f), Err(Rejection::MissingState));
    }

    #[test]
    fn empty_gender_rejects_row() {
        let mut f = valid_fields();
        f.gender = String::new();
        assert_eq!(coerce(&f), Err(Rejection::MissingGender));
    }

    #[test]
    fn decoded_row_without_gender_is_rejected() {
        let rows = crate::ingestion::csv::decode_csv_str("Name,Gender,City,State\nAsha,,Pune,MH\n").unwrap();
        let resolved = crate::ingestion::resolve_fields(&rows[0]);
        assert_eq!(coerce(&resolved), Err(Rejection::MissingGender));
    }

    #[test]
    fn leading_int_prefix() {
        assert_eq!(parse_leading_int("1000.7"), Some(1000));
        assert_eq!(parse_leading_int("  12k"), Some(12));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn leading_float_prefix() {
        assert_eq!(parse_leading_float("3.5%"), Some(3.5));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("5."), Some(5.0));
        assert_eq!(parse_leading_float("1e2x"), Some(100.0));
        assert_eq!(parse_leading_float("2e"), Some(2.0));
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("x1"), None);
    }

    #[test]
    fn manual_entry_requires_identifying_fields() {
        let entry = ManualEntry {
            name: "Asha".to_string(),
            gender: "Female".to_string(),
            city: "Pune".to_string(),
            ..Default::default()
        };
        let err = CanonicalFields::from_manual_entry(&entry).unwrap_err();
        assert!(err.to_string().contains("required fields"));
    }

    #[test]
    fn manual_entry_rejects_unknown_gender() {
        let entry = ManualEntry {
            name: "Asha".to_string(),
            gender: "female".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            followers: "2500".to_string(),
            ..Default::default()
        };
        assert!(CanonicalFields::from_manual_entry(&entry).is_err());

        let ok = ManualEntry {
            gender: "Female".to_string(),
            ..entry
        };
        let fields = CanonicalFields::from_manual_entry(&ok).unwrap();
        assert_eq!(fields.followers, 2500);
        assert_eq!(fields.gender, Gender::Female);
    }

    #[test]
    fn manual_entry_rejects_out_of_range_numbers() {
        let base = ManualEntry {
            name: "Asha".to_string(),
            gender: "Female".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            ..Default::default()
        };

        let high_er = ManualEntry {
            er: "150".to_string(),
            ..base.clone()
        };
        let err = CanonicalFields::from_manual_entry(&high_er).unwrap_err();
        assert_eq!(err.to_string(), "er must be between 0 and 100");

        let negative = ManualEntry {
            followers: "-3".to_string(),
            ..base.clone()
        };
        let err = CanonicalFields::from_manual_entry(&negative).unwrap_err();
        assert_eq!(err.to_string(), "followers must be greater than or equal to 0");

        let blank = CanonicalFields::from_manual_entry(&base).unwrap();
        assert_eq!(blank.followers, 0);
        assert_eq!(blank.er, 0.0);
    }
}
