//! Pipeline error surface.
//!
//! Every failure a pipeline run can produce collapses into a single
//! [`ProcessError`]. The display messages are user-facing: the web client
//! shows them verbatim next to the upload control, so they stay short and
//! free of technical detail. The underlying codec error is preserved as an
//! error source for logging.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors reported by [`crate::pipeline::process_upload`].
///
/// All variants are scoped to a single pipeline invocation; nothing here is
/// fatal to the host. Input validation variants (`InvalidInput`,
/// `MissingCrop`, `InvalidOptions`) are surfaced before any decoding starts.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// No file bytes were supplied, or the declared media type is not an
    /// image.
    #[error("Please select an image file.")]
    InvalidInput,

    /// No crop rectangle was supplied.
    #[error("Please crop the image before uploading.")]
    MissingCrop,

    /// An option value is outside its valid domain.
    #[error("Image processing options are invalid: {0}")]
    InvalidOptions(String),

    /// Neither decode path could interpret the bytes as an image.
    #[error("Selected file is not a valid image.")]
    Decode(#[source] CodecError),

    /// The encoder never produced a usable result.
    #[error("Could not process the selected image.")]
    EncodingUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ProcessError::InvalidInput.to_string(),
            "Please select an image file."
        );
        assert_eq!(
            ProcessError::MissingCrop.to_string(),
            "Please crop the image before uploading."
        );
        assert_eq!(
            ProcessError::EncodingUnavailable.to_string(),
            "Could not process the selected image."
        );
    }

    #[test]
    fn decode_error_keeps_its_source() {
        use std::error::Error as _;

        let err = ProcessError::Decode(CodecError::Decode("bad marker".to_string()));
        assert_eq!(err.to_string(), "Selected file is not a valid image.");
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_options_carries_detail() {
        let err = ProcessError::InvalidOptions("targetBytes must be at least 1".to_string());
        assert!(err.to_string().contains("targetBytes"));
    }
}
