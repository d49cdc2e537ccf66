//! Header alias resolution.
//!
//! Source documents spell their headers in many ways (`Contact No`, `contact_no`, `Phone`, ...).
//! [`resolve`] maps a [`RawRow`] onto one canonical field using an ordered alias list, and
//! [`resolve_fields`] applies it independently to every [`CanonicalField`].

use crate::types::RawRow;

/// The canonical fields an imported row is resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    InstagramUrl,
    Followers,
    AverageView,
    Er,
    Language,
    Gender,
    State,
    City,
    ContactNo,
    Commercial,
}

impl CanonicalField {
    /// All fields in schema order.
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::Name,
        CanonicalField::InstagramUrl,
        CanonicalField::Followers,
        CanonicalField::AverageView,
        CanonicalField::Er,
        CanonicalField::Language,
        CanonicalField::Gender,
        CanonicalField::State,
        CanonicalField::City,
        CanonicalField::ContactNo,
        CanonicalField::Commercial,
    ];

    /// Header aliases in priority order.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Name => &["name", "Name", "NAME", "fullname", "Full Name"],
            CanonicalField::InstagramUrl => &[
                "instagramurl",
                "Instagram URL",
                "instagram url",
                "instagram",
                "Instagram",
                "insta url",
                "Insta URL",
            ],
            CanonicalField::Followers => &["followers", "Followers", "FOLLOWERS", "follower", "Follower"],
            CanonicalField::AverageView => &[
                "averageview",
                "Average View",
                "average view",
                "avg view",
                "Avg View",
                "averageviews",
                "Average Views",
            ],
            CanonicalField::Er => &[
                "er",
                "ER",
                "er (%)",
                "ER (%)",
                "engagement rate",
                "Engagement Rate",
                "engagement",
                "Engagement",
            ],
            CanonicalField::Language => &["language", "Language", "LANGUAGE", "lang", "Lang"],
            CanonicalField::Gender => &["gender", "Gender", "GENDER", "sex", "Sex"],
            CanonicalField::State => &["state", "State", "STATE"],
            CanonicalField::City => &["city", "City", "CITY"],
            CanonicalField::ContactNo => &[
                "contactno",
                "Contact No",
                "contact no",
                "Contact Number",
                "contact number",
                "ContactNo",
                "contactNo",
                "CONTACTNO",
                "contact_no",
                "Contact_No",
                "CONTACT_NO",
                "phone",
                "Phone",
                "PHONE",
                "phone number",
                "Phone Number",
                "phone_number",
                "Phone_Number",
                "mobile",
                "Mobile",
                "MOBILE",
                "mobile number",
                "Mobile Number",
                "mobile_number",
                "Mobile_Number",
                "contact",
                "Contact",
                "CONTACT",
                "whatsapp",
                "WhatsApp",
                "whatsapp number",
                "WhatsApp Number",
            ],
            CanonicalField::Commercial => &[
                "commercial",
                "Commercial",
                "COMMERCIAL",
                "Commercials",
                "commercials",
                "COMMERCIALS",
                "commercial value",
                "Commercial Value",
                "commercial_value",
                "Commercial_Value",
            ],
        }
    }
}

/// Resolve one field from `row` using `candidates` as a priority list.
///
/// 1. Exact key lookup, in candidate order. The first candidate whose value is non-empty wins.
/// 2. Otherwise compare keys after lower-casing and deleting whitespace, `-` and `_`
///    (candidates outer, row keys inner).
/// 3. Otherwise the empty string.
///
/// Returned values are trimmed.
pub fn resolve(row: &RawRow, candidates: &[&str]) -> String {
    for key in candidates {
        if let Some(text) = row.get(key).map(|v| v.to_text()) {
            if !text.is_empty() {
                return text.trim().to_owned();
            }
        }
    }

    for key in candidates {
        let wanted = normalize_header(key);
        for (row_key, value) in row.iter() {
            if normalize_header(row_key) != wanted {
                continue;
            }
            let text = value.to_text();
            if !text.is_empty() {
                return text.trim().to_owned();
            }
        }
    }

    String::new()
}

/// Lower-case and drop whitespace, hyphens and underscores.
pub fn normalize_header(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Every canonical field of one row, as trimmed text (empty = absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub name: String,
    pub instagramurl: String,
    pub followers: String,
    pub average_view: String,
    pub er: String,
    pub language: String,
    pub gender: String,
    pub state: String,
    pub city: String,
    pub contactno: String,
    pub commercial: String,
}

impl ResolvedFields {
    fn slot_mut(&mut self, field: CanonicalField) -> &mut String {
        match field {
            CanonicalField::Name => &mut self.name,
            CanonicalField::InstagramUrl => &mut self.instagramurl,
            CanonicalField::Followers => &mut self.followers,
            CanonicalField::AverageView => &mut self.average_view,
            CanonicalField::Er => &mut self.er,
            CanonicalField::Language => &mut self.language,
            CanonicalField::Gender => &mut self.gender,
            CanonicalField::State => &mut self.state,
            CanonicalField::City => &mut self.city,
            CanonicalField::ContactNo => &mut self.contactno,
            CanonicalField::Commercial => &mut self.commercial,
        }
    }
}

/// Resolve every canonical field of `row` independently.
pub fn resolve_fields(row: &RawRow) -> ResolvedFields {
    let mut out = ResolvedFields::default();
    for field in CanonicalField::ALL {
        *out.slot_mut(field) = resolve(row, field.aliases());
    }
    out
}
