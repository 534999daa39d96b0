use std::path::PathBuf;

use thiserror::Error;

/// Why a region did not yield a valid envelope.
///
/// `IncompleteData` and `InvalidMagic` usually mean "not an Aurora card",
/// the other two mean "an Aurora card, but damaged".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorruptionReason {
    /// The region holds fewer bits than the length header announces
    #[error("incomplete data: {needed} bits needed, {available} available")]
    IncompleteData { needed: usize, available: usize },

    /// The decoded bytes do not start with the magic tag
    #[error("magic header mismatch")]
    InvalidMagic,

    /// The stored checksum does not match the digest of the payload
    #[error("checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    /// The payload is not UTF-8, not JSON, or not a JSON object
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Error, Debug)]
pub enum AuroraError {
    /// The envelope does not fit into the embedding region of the carrier image
    #[error("Capacity Error: {needed} bits needed, but the embedding region only holds {available} bits")]
    CapacityExceeded { needed: usize, available: usize },

    /// The image already carries a record and overwriting was not requested
    #[error("Image {0:?} already contains embedded data, request an overwrite or edit it instead")]
    AlreadyEmbedded(PathBuf),

    /// No decodable envelope was found, see the reason for which check failed
    #[error("No valid Aurora data found: {0}")]
    CorruptedOrAbsentData(#[from] CorruptionReason),

    /// Any error raised inside an edit scope, the image was left untouched
    #[error("Failed to edit card {path:?}")]
    EditAborted {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Represents a failure to read or decode the carrier image
    #[error("Cannot read image {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Represents a failure to encode or write the target image
    #[error("Cannot write image {path:?}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Lossy formats destroy the least significant bits on re-compression
    #[error("Output format of {0:?} is lossy, only PNG can carry embedded data")]
    LossyOutputFormat(PathBuf),

    /// Represents a failure when serializing a record into JSON
    #[error("Record serialization error")]
    SerializationError(#[from] serde_json::Error),

    /// Cards are edited in place, which only a PNG path allows
    #[error("Card {0:?} is not a PNG file, embed it into a PNG before editing")]
    NotEditable(PathBuf),

    /// No carrier image was given to an embed
    #[error("No carrier image set")]
    CarrierNotSet,

    /// A worker of a batch update panicked before producing a result
    #[error("Batch update worker for {0:?} panicked")]
    WorkerPanicked(PathBuf),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl AuroraError {
    /// The decode sub-reason, if this is a `CorruptedOrAbsentData` error
    pub fn corruption_reason(&self) -> Option<&CorruptionReason> {
        match self {
            AuroraError::CorruptedOrAbsentData(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_the_corruption_reason() {
        let e: AuroraError = CorruptionReason::InvalidMagic.into();
        assert_eq!(e.corruption_reason(), Some(&CorruptionReason::InvalidMagic));

        let e = AuroraError::CapacityExceeded {
            needed: 10,
            available: 9,
        };
        assert!(e.corruption_reason().is_none());
    }

    #[test]
    fn should_render_which_check_failed() {
        let e: AuroraError = CorruptionReason::ChecksumMismatch {
            stored: "deadbeef".to_string(),
            computed: "0badf00d".to_string(),
        }
        .into();

        assert_eq!(
            e.to_string(),
            "No valid Aurora data found: checksum mismatch: stored deadbeef, computed 0badf00d"
        );
    }
}
