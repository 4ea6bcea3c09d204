//! Issuing-engine boundary.
//!
//! The pipeline hands an assembled [`IdentityRecord`] to a [`CardIssuer`]
//! and gets back a [`RenderedCard`]. The built-in [`QrCardEngine`] covers
//! the common deployment; alternative engines (a signing service, a
//! hardware issuer) plug in through the same trait.

use std::io::Cursor;

use image::GrayImage;

use crate::record::IdentityRecord;

mod qr;
pub use qr::*;

/// Opaque signing/visibility key material for an issuing engine.
///
/// The pipeline itself never supplies one; it is part of the boundary so
/// engines that sign can accept it without changing the call site.
#[derive(Debug, Clone)]
pub struct IssuerKey(pub Vec<u8>);

/// Rejection of an assembled record by the issuing engine.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error("record does not fit in a QR symbol")]
    PayloadTooLarge,

    #[error("record encoding failed: {0}")]
    Encoding(#[from] serde_cbor::Error),

    #[error("QR symbol construction failed: {0}")]
    Qr(qrcode::types::QrError),

    #[error("issuing engine rejected the record: {0}")]
    Engine(String),
}

impl IssuanceError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }
}

/// Issuing engine: turns an assembled identity record into a renderable
/// card artifact.
pub trait CardIssuer {
    fn issue(
        &self,
        record: &IdentityRecord,
        key: Option<&IssuerKey>,
    ) -> Result<RenderedCard, IssuanceError>;
}

impl<T: CardIssuer + ?Sized> CardIssuer for &T {
    fn issue(
        &self,
        record: &IdentityRecord,
        key: Option<&IssuerKey>,
    ) -> Result<RenderedCard, IssuanceError> {
        (**self).issue(record, key)
    }
}

/// In-memory rendering of an issued card.
///
/// Lifecycle is create, serialize, discard; a rendered card is never
/// persisted by this crate.
pub struct RenderedCard {
    bitmap: GrayImage,
    payload: Vec<u8>,
}

impl RenderedCard {
    pub fn new(bitmap: GrayImage, payload: Vec<u8>) -> Self {
        Self { bitmap, payload }
    }

    pub fn bitmap(&self) -> &GrayImage {
        &self.bitmap
    }

    /// Raw card payload carried by the symbol, as handed to the QR
    /// renderer. Feed it to [`decode_card_payload`] to read the record
    /// back.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serializes the bitmap into a PNG container.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Vec::new();
        self.bitmap
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(buffer)
    }
}
