use image::Luma;
use qrcode::{types::QrError, QrCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{CardIssuer, IssuanceError, IssuerKey, RenderedCard};
use crate::record::{IdentityRecord, VisibleDetails};

const ENVELOPE_VERSION: u8 = 1;

/// Wire envelope around the CBOR-encoded identity record.
///
/// The digest covers the record bytes so a scanned payload can be
/// integrity-checked before the record is trusted.
#[derive(Debug, Serialize, Deserialize)]
struct CardEnvelope {
    version: u8,
    record: Vec<u8>,
    visible: VisibleDetails,
    digest: [u8; 32],
}

/// Built-in issuing engine: a CBOR record envelope rendered as a
/// byte-mode QR symbol.
///
/// The symbol's error-correction level stays at the renderer default.
/// Encoding is deterministic, so identical records produce identical
/// payloads and bitmaps.
#[derive(Debug, Clone)]
pub struct QrCardEngine {
    visible: VisibleDetails,
    min_dimensions: u32,
}

impl QrCardEngine {
    pub fn new(visible: VisibleDetails) -> Self {
        Self {
            visible,
            min_dimensions: 256,
        }
    }

    pub fn encode_card_payload(&self, record: &IdentityRecord) -> Result<Vec<u8>, IssuanceError> {
        let record_bytes = serde_cbor::to_vec(record)?;
        let digest: [u8; 32] = Sha256::digest(&record_bytes).into();

        let envelope = CardEnvelope {
            version: ENVELOPE_VERSION,
            record: record_bytes,
            visible: self.visible,
            digest,
        };

        Ok(serde_cbor::to_vec(&envelope)?)
    }
}

impl CardIssuer for QrCardEngine {
    fn issue(
        &self,
        record: &IdentityRecord,
        _key: Option<&IssuerKey>,
    ) -> Result<RenderedCard, IssuanceError> {
        let payload = self.encode_card_payload(record)?;

        let code = QrCode::new(&payload).map_err(|e| match e {
            QrError::DataTooLong => IssuanceError::PayloadTooLarge,
            other => IssuanceError::Qr(other),
        })?;

        let bitmap = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_dimensions, self.min_dimensions)
            .build();

        Ok(RenderedCard::new(bitmap, payload))
    }
}

/// Card payload decoded back from a scanned symbol.
#[derive(Debug)]
pub struct DecodedCard {
    pub record: IdentityRecord,
    pub visible: VisibleDetails,
}

#[derive(Debug, thiserror::Error)]
pub enum CardDecodeError {
    #[error("unsupported card envelope version {0}")]
    UnsupportedVersion(u8),

    #[error("card payload digest mismatch")]
    DigestMismatch,

    #[error("card payload decoding failed: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

/// Reads an identity record back out of a card payload produced by
/// [`QrCardEngine`], verifying the record digest.
pub fn decode_card_payload(bytes: &[u8]) -> Result<DecodedCard, CardDecodeError> {
    let envelope: CardEnvelope = serde_cbor::from_slice(bytes)?;

    if envelope.version != ENVELOPE_VERSION {
        return Err(CardDecodeError::UnsupportedVersion(envelope.version));
    }

    let digest: [u8; 32] = Sha256::digest(&envelope.record).into();
    if digest != envelope.digest {
        return Err(CardDecodeError::DigestMismatch);
    }

    let record = serde_cbor::from_slice(&envelope.record)?;

    Ok(DecodedCard {
        record,
        visible: envelope.visible,
    })
}
