use crate::engine::IssuanceError;

/// Failure of a single card-generation request.
///
/// Every variant other than the absorbed photo-decode case (see
/// [`crate::photo`]) surfaces here, so callers can tell bad input apart
/// from an internal issuing failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInput),

    #[error(transparent)]
    MalformedDate(#[from] MalformedDateError),

    #[error("card issuance failed: {0}")]
    Issuance(#[from] IssuanceError),

    #[error("failed to serialize card bitmap: {0}")]
    ImageSerialization(#[from] image::ImageError),
}

/// Structurally invalid request input.
#[derive(Debug, thiserror::Error)]
pub enum MalformedInput {
    #[error("credential subject is not a valid JSON object: {0}")]
    Subject(#[from] serde_json::Error),

    #[error("photo descriptor is missing its `,` separator")]
    MissingSeparator,

    #[error("photo descriptor body is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Date-of-birth string rejected by the `yyyy/MM/d` parser.
#[derive(Debug, thiserror::Error)]
pub enum MalformedDateError {
    #[error("date of birth `{0}` does not match the `yyyy/MM/d` pattern")]
    Pattern(String),

    #[error("date of birth `{0}` is not a valid calendar date")]
    Calendar(String),
}
