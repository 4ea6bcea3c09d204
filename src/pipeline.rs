use tracing::debug;

use crate::engine::{CardIssuer, QrCardEngine};
use crate::error::Error;
use crate::fields::{map_fields, CredentialSubject, PhotoDescriptor};
use crate::photo;
use crate::record::{Detail, VisibleDetails};

/// Pipeline configuration, fixed at construction and read-only
/// thereafter.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Identity fields marked visible when an issued card is later
    /// decoded and displayed.
    pub visible_details: VisibleDetails,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            visible_details: [Detail::GivenName, Detail::SurName, Detail::PlaceOfBirth]
                .into_iter()
                .collect(),
        }
    }
}

/// Card-generation pipeline.
///
/// One instance is meant to live for the whole process and serve many
/// concurrent requests: it holds only configuration and an issuing
/// engine, no per-request state, so no locking is needed around
/// [`generate_qr_code`](Self::generate_qr_code).
pub struct CardPipeline<E = QrCardEngine> {
    engine: E,
    config: PipelineConfig,
}

impl CardPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            engine: QrCardEngine::new(config.visible_details),
            config,
        }
    }
}

impl Default for CardPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<E: CardIssuer> CardPipeline<E> {
    /// Builds a pipeline around a custom issuing engine.
    pub fn with_engine(engine: E, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generates a PNG-serialized QR code for one identity request.
    ///
    /// - `credential_subject_json`: JSON object with `uin`, `gender`,
    ///   `givenName`, `surName`, `placeOfBirth`, `dateOfBirth`
    ///   (`yyyy/MM/d`) and `address`.
    /// - `pin_code`: opaque access-control string, passed through.
    /// - `photo_data_uri`: `<codecTag>,<base64Body>` holding a JPEG 2000
    ///   photo. An undecodable photo downgrades to a card without one;
    ///   every other failure is a typed [`Error`].
    ///
    /// All-or-nothing per request: no partial output is ever produced.
    pub fn generate_qr_code(
        &self,
        credential_subject_json: &str,
        pin_code: &str,
        photo_data_uri: &str,
    ) -> Result<Vec<u8>, Error> {
        let subject = CredentialSubject::from_json(credential_subject_json)?;
        let descriptor = PhotoDescriptor::parse(photo_data_uri)?;
        let photo_bytes = descriptor.decode_body()?;

        let photo = photo::transcode_to_jpeg(descriptor.codec_tag, &photo_bytes);
        debug!(photo_present = photo.is_some(), "photo transcoded");

        let record = map_fields(&subject, pin_code, photo)?;
        debug!("record assembled");

        let card = self.engine.issue(&record, None)?;
        debug!("card issued");

        Ok(card.to_png()?)
    }
}
