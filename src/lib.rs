//! Identity-card QR generation pipeline.
//!
//! Converts a JSON credential subject, a pin code and a base64 photo
//! data URI into a QR-encoded identity card, returned as PNG bytes:
//! the field mapper produces a typed [`IdentityRecord`], the photo
//! transcoder bridges JPEG 2000 photos to baseline JPEG, and an issuing
//! engine (the [`CardIssuer`] boundary) renders the record as a
//! scannable symbol.
//!
//! ```no_run
//! use idcard_qr::CardPipeline;
//!
//! let pipeline = CardPipeline::default();
//! let png = pipeline.generate_qr_code(
//!     r#"{"uin":"123","givenName":"Jane","surName":"Doe","dateOfBirth":"1990/05/14"}"#,
//!     "1234",
//!     "data:image/jp2;base64,AAAADGpQICANCocK",
//! )?;
//! # Ok::<_, idcard_qr::Error>(())
//! ```

pub mod engine;
pub mod error;
pub mod fields;
pub mod photo;
pub mod pipeline;
pub mod record;

pub use engine::{
    decode_card_payload, CardDecodeError, CardIssuer, DecodedCard, IssuanceError, IssuerKey,
    QrCardEngine, RenderedCard,
};
pub use error::{Error, MalformedDateError, MalformedInput};
pub use fields::{map_fields, CredentialSubject, PhotoDescriptor};
pub use pipeline::{CardPipeline, PipelineConfig};
pub use record::{CalendarDate, Detail, ExtraEntry, IdentityRecord, VisibleDetails};
