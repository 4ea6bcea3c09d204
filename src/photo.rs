//! Photo transcoding from the JPEG 2000 family to baseline JPEG.
//!
//! This is a pure format bridge: the wavelet-coded input is decoded into
//! a pixel buffer and re-encoded with default JPEG parameters. No
//! resizing, cropping or color-space correction. Every failure in here
//! is absorbed into a "photo absent" outcome; a card without a photo is
//! still useful output.

use std::collections::HashMap;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use lazy_static::lazy_static;

/// JP2 container signature box.
const JP2_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0c, 0x6a, 0x50, 0x20, 0x20, 0x0d, 0x0a, 0x87, 0x0a,
];

/// Raw codestream start-of-codestream marker, followed by SIZ.
const J2K_SOC: [u8; 4] = [0xff, 0x4f, 0xff, 0x51];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoCodec {
    /// JP2 boxed container.
    Jp2,
    /// Bare JPEG 2000 codestream.
    J2k,
}

lazy_static! {
    /// Declared data-URI codec tags the transcoder knows how to
    /// cross-check against the sniffed byte signature.
    static ref CODEC_TAGS: HashMap<&'static str, PhotoCodec> = {
        let mut map = HashMap::new();
        map.insert("data:image/jp2;base64", PhotoCodec::Jp2);
        map.insert("data:image/jpx;base64", PhotoCodec::Jp2);
        map.insert("data:image/j2k;base64", PhotoCodec::J2k);
        map
    };
}

/// Identifies the codec from the leading byte signature.
pub fn sniff_codec(bytes: &[u8]) -> Option<PhotoCodec> {
    if bytes.starts_with(&JP2_SIGNATURE) {
        Some(PhotoCodec::Jp2)
    } else if bytes.starts_with(&J2K_SOC) {
        Some(PhotoCodec::J2k)
    } else {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoDecodeError {
    #[error("unrecognized image codec signature")]
    UnknownSignature,

    #[error("JPEG 2000 decode failed: {0}")]
    Jpeg2000(#[from] jpeg2k::error::Error),

    #[error("JPEG re-encode failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Converts wavelet-coded photo bytes into baseline JPEG bytes.
///
/// Returns `None` on any decode or re-encode failure, after logging;
/// the caller continues without a photo.
pub fn transcode_to_jpeg(codec_tag: &str, bytes: &[u8]) -> Option<Vec<u8>> {
    match try_transcode(codec_tag, bytes) {
        Ok(jpeg) => Some(jpeg),
        Err(e) => {
            tracing::warn!("photo transcode failed, continuing without photo: {e}");
            None
        }
    }
}

fn try_transcode(codec_tag: &str, bytes: &[u8]) -> Result<Vec<u8>, PhotoDecodeError> {
    let sniffed = sniff_codec(bytes).ok_or(PhotoDecodeError::UnknownSignature)?;

    // The byte signature wins over the declared tag; the tag mismatch is
    // only worth a warning.
    if let Some(declared) = CODEC_TAGS.get(codec_tag) {
        if *declared != sniffed {
            tracing::warn!(%codec_tag, "declared photo codec does not match byte signature");
        }
    }

    let decoded = jpeg2k::Image::from_bytes(bytes)?;
    let image: DynamicImage = (&decoded).try_into()?;
    encode_jpeg(&image)
}

pub(crate) fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, PhotoDecodeError> {
    // JPEG carries no alpha channel; flatten before encoding.
    let flattened;
    let image = match image {
        DynamicImage::ImageRgba8(_) | DynamicImage::ImageLumaA8(_) => {
            flattened = DynamicImage::ImageRgb8(image.to_rgb8());
            &flattened
        }
        other => other,
    };

    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)?;
    Ok(buffer)
}
