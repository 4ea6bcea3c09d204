use serde::{Deserialize, Serialize};

/// Calendar date decomposed into year, month and day.
///
/// No locale, no time zone. Construction goes through the field mapper,
/// which guarantees the components denote an existing calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

/// Ordered key/value entry carried alongside the core record fields.
///
/// Extras are lists, not maps: keys are unique per list by convention
/// only, and consumers must not assume uniqueness is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraEntry {
    pub key: String,
    pub value: String,
}

impl ExtraEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Typed intermediate identity record, holding every field destined for
/// the issued card.
///
/// Constructed once per request by [`crate::fields::map_fields`], handed
/// to a [`crate::engine::CardIssuer`] and discarded. Field values are
/// transcribed from the input without normalization; data-quality policy
/// is not owned here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Opaque access-control string, passed through unmodified.
    pub pin: String,
    pub given_name: String,
    pub sur_name: String,
    pub place_of_birth: String,
    pub date_of_birth: CalendarDate,
    /// Baseline-JPEG photo bytes. Absent when transcoding failed; a card
    /// without a photo is still valid output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<u8>>,
    /// Entries not meant for casual disclosure.
    pub priv_extras: Vec<ExtraEntry>,
    /// Entries safe for open display.
    pub pub_extras: Vec<ExtraEntry>,
}

/// Identity fields that can be marked visible when an issued card is
/// later decoded and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detail {
    GivenName,
    SurName,
    PlaceOfBirth,
    DateOfBirth,
    Photo,
}

impl Detail {
    pub const LIST: [Detail; 5] = [
        Detail::GivenName,
        Detail::SurName,
        Detail::PlaceOfBirth,
        Detail::DateOfBirth,
        Detail::Photo,
    ];

    fn mask(self) -> u32 {
        1u32 << (self as u32)
    }
}

/// Bitwise combination of [`Detail`] flags.
///
/// Set once at pipeline construction and read-only thereafter, so it is
/// safe for unsynchronized concurrent reads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibleDetails(u32);

impl VisibleDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_u32(self) -> u32 {
        self.0
    }

    pub fn contains(&self, detail: Detail) -> bool {
        self.0 & detail.mask() != 0
    }

    pub fn insert(&mut self, detail: Detail) {
        self.0 |= detail.mask()
    }

    pub fn remove(&mut self, detail: Detail) {
        self.0 &= !detail.mask()
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = Detail> {
        Detail::LIST
            .iter()
            .copied()
            .filter(|detail| self.contains(*detail))
    }
}

impl FromIterator<Detail> for VisibleDetails {
    fn from_iter<I: IntoIterator<Item = Detail>>(iter: I) -> Self {
        let mut details = Self::new();
        for detail in iter {
            details.insert(detail);
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::{Detail, VisibleDetails};

    #[test]
    fn visible_details_bitmask() {
        let mut details = VisibleDetails::new();
        details.insert(Detail::GivenName);
        details.insert(Detail::SurName);
        details.insert(Detail::PlaceOfBirth);
        assert_eq!(details.into_u32(), 0b111);

        assert!(details.contains(Detail::SurName));
        assert!(!details.contains(Detail::Photo));

        details.remove(Detail::SurName);
        assert!(!details.contains(Detail::SurName));
        assert_eq!(details.into_u32(), 0b101);
    }

    #[test]
    fn visible_details_iter_in_declaration_order() {
        let details: VisibleDetails = [Detail::Photo, Detail::GivenName].into_iter().collect();
        let listed: Vec<_> = details.iter().collect();
        assert_eq!(listed, [Detail::GivenName, Detail::Photo]);
    }
}
