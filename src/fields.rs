use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{MalformedDateError, MalformedInput};
use crate::record::{CalendarDate, ExtraEntry, IdentityRecord};

/// Credential subject fields consumed from the input JSON.
///
/// Unknown keys are ignored; absent fields deserialize to the empty
/// string. Only `dateOfBirth` is validated beyond presence.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialSubject {
    pub uin: String,
    pub gender: String,
    pub given_name: String,
    pub sur_name: String,
    pub place_of_birth: String,
    pub date_of_birth: String,
    pub address: String,
}

impl CredentialSubject {
    pub fn from_json(json: &str) -> Result<Self, MalformedInput> {
        serde_json::from_str(json).map_err(Into::into)
    }
}

/// Photo descriptor of the form `<codecTag>,<base64Body>`.
///
/// The first `,` is the only meaningful split point; the codec tag is
/// informational and cross-checked against the actual byte signature by
/// the transcoder.
#[derive(Debug, Clone, Copy)]
pub struct PhotoDescriptor<'a> {
    pub codec_tag: &'a str,
    body: &'a str,
}

impl<'a> PhotoDescriptor<'a> {
    pub fn parse(data_uri: &'a str) -> Result<Self, MalformedInput> {
        let (codec_tag, body) = data_uri
            .split_once(',')
            .ok_or(MalformedInput::MissingSeparator)?;
        Ok(Self { codec_tag, body })
    }

    pub fn decode_body(&self) -> Result<Vec<u8>, MalformedInput> {
        STANDARD.decode(self.body).map_err(Into::into)
    }
}

/// Parses a `yyyy/MM/d` date-of-birth string: 4-digit year, 1–2 digit
/// month, 1–2 digit day. No fallback formats. Non-existent calendar
/// dates (month 13, February 30) are rejected.
pub fn parse_date_of_birth(value: &str) -> Result<CalendarDate, MalformedDateError> {
    let mut parts = value.split('/');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(MalformedDateError::Pattern(value.to_owned()));
    };

    let (Some(year), Some(month), Some(day)) = (
        parse_component(year, 4, 4),
        parse_component(month, 1, 2),
        parse_component(day, 1, 2),
    ) else {
        return Err(MalformedDateError::Pattern(value.to_owned()));
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| MalformedDateError::Calendar(value.to_owned()))?;

    Ok(CalendarDate {
        year: year as i32,
        month: month as u8,
        day: day as u8,
    })
}

fn parse_component(digits: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if digits.len() < min_len
        || digits.len() > max_len
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

/// Field Mapper: transcribes a parsed credential subject, the pin code
/// and the (already transcoded) photo into an [`IdentityRecord`].
///
/// Pure data transcription; no trimming or case-folding is performed.
/// The UIN lands in the private extras, gender and address in the public
/// ones, matching how issued cards are laid out for inspection.
pub fn map_fields(
    subject: &CredentialSubject,
    pin_code: &str,
    photo: Option<Vec<u8>>,
) -> Result<IdentityRecord, MalformedDateError> {
    let date_of_birth = parse_date_of_birth(&subject.date_of_birth)?;

    Ok(IdentityRecord {
        pin: pin_code.to_owned(),
        given_name: subject.given_name.clone(),
        sur_name: subject.sur_name.clone(),
        place_of_birth: subject.place_of_birth.clone(),
        date_of_birth,
        photo,
        priv_extras: vec![ExtraEntry::new("UIN", &subject.uin)],
        pub_extras: vec![
            ExtraEntry::new("Gender", &subject.gender),
            ExtraEntry::new("Address", &subject.address),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::{map_fields, parse_date_of_birth, CredentialSubject, PhotoDescriptor};
    use crate::error::{MalformedDateError, MalformedInput};
    use crate::record::CalendarDate;

    const SUBJECT_JSON: &str = r#"{
        "uin": "123",
        "gender": "M",
        "givenName": "Jane",
        "surName": "Doe",
        "placeOfBirth": "X",
        "dateOfBirth": "1990/05/14",
        "address": "Y"
    }"#;

    #[test]
    fn date_decomposition() {
        assert_eq!(
            parse_date_of_birth("1990/05/14").unwrap(),
            CalendarDate {
                year: 1990,
                month: 5,
                day: 14
            }
        );

        // Single-digit month and day are allowed by the pattern.
        assert_eq!(
            parse_date_of_birth("2001/1/7").unwrap(),
            CalendarDate {
                year: 2001,
                month: 1,
                day: 7
            }
        );
    }

    #[test]
    fn date_pattern_violations() {
        for input in [
            "2020-01-01",
            "99/99/9999",
            "1990/05",
            "1990/05/14/2",
            "199O/05/14",
            "",
        ] {
            assert!(
                matches!(
                    parse_date_of_birth(input),
                    Err(MalformedDateError::Pattern(_))
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn impossible_calendar_dates() {
        for input in ["1990/13/01", "2019/02/29", "2020/04/31", "2020/00/10"] {
            assert!(
                matches!(
                    parse_date_of_birth(input),
                    Err(MalformedDateError::Calendar(_))
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn leap_day_is_valid() {
        assert_eq!(
            parse_date_of_birth("2020/2/29").unwrap(),
            CalendarDate {
                year: 2020,
                month: 2,
                day: 29
            }
        );
    }

    #[test]
    fn subject_mapping() {
        let subject = CredentialSubject::from_json(SUBJECT_JSON).unwrap();
        let record = map_fields(&subject, "1234", None).unwrap();

        assert_eq!(record.pin, "1234");
        assert_eq!(record.given_name, "Jane");
        assert_eq!(record.sur_name, "Doe");
        assert_eq!(record.place_of_birth, "X");
        assert_eq!(
            record.date_of_birth,
            CalendarDate {
                year: 1990,
                month: 5,
                day: 14
            }
        );
        assert!(record.photo.is_none());

        assert_eq!(record.priv_extras.len(), 1);
        assert_eq!(record.priv_extras[0].key, "UIN");
        assert_eq!(record.priv_extras[0].value, "123");

        let pub_keys: Vec<_> = record.pub_extras.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(pub_keys, ["Gender", "Address"]);
    }

    #[test]
    fn absent_fields_map_to_empty_strings() {
        let subject =
            CredentialSubject::from_json(r#"{"dateOfBirth": "1990/05/14"}"#).unwrap();
        let record = map_fields(&subject, "1234", None).unwrap();

        assert_eq!(record.given_name, "");
        assert_eq!(record.priv_extras[0].value, "");
    }

    #[test]
    fn values_are_not_normalized() {
        let subject = CredentialSubject::from_json(
            r#"{"givenName": "  jane ", "dateOfBirth": "1990/05/14"}"#,
        )
        .unwrap();
        let record = map_fields(&subject, "1234", None).unwrap();
        assert_eq!(record.given_name, "  jane ");
    }

    #[test]
    fn photo_descriptor_split() {
        let descriptor = PhotoDescriptor::parse("data:image/jp2;base64,AAEC").unwrap();
        assert_eq!(descriptor.codec_tag, "data:image/jp2;base64");
        assert_eq!(descriptor.decode_body().unwrap(), [0, 1, 2]);
    }

    #[test]
    fn photo_descriptor_missing_separator() {
        assert!(matches!(
            PhotoDescriptor::parse("AAEC"),
            Err(MalformedInput::MissingSeparator)
        ));
    }

    #[test]
    fn photo_descriptor_invalid_base64() {
        let descriptor = PhotoDescriptor::parse("data:image/jp2;base64,@@@@").unwrap();
        assert!(matches!(
            descriptor.decode_body(),
            Err(MalformedInput::InvalidBase64(_))
        ));
    }
}
