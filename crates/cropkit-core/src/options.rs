//! Encoding options and their validation.

use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

/// Preferred lossy output format for processed uploads.
pub const WEBP_MIME: &str = "image/webp";

/// Universal lossy fallback when the preferred format cannot be encoded.
pub const JPEG_MIME: &str = "image/jpeg";

/// Lossless format; accepted on input and mapped in the extension table.
pub const PNG_MIME: &str = "image/png";

/// Tuning knobs for the render/encode loop.
///
/// Defaults are sized for profile-picture uploads: WebP output capped at
/// 1024px on the longer side, aiming under 400 KiB. Fields deserialize from
/// camelCase JavaScript objects, and any missing field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodingOptions {
    /// Preferred output media type. Negotiated down to JPEG when the
    /// encoder cannot produce it.
    pub output_format: String,
    /// Cap on the longer side of the rendered output, in pixels.
    pub max_dimension: u32,
    /// Desired upper bound on the encoded size, in bytes.
    pub target_bytes: u64,
    /// Lower bound on encoder quality, exclusive in `(0, 1)`.
    pub min_quality: f64,
    /// Bound on quality attempts per size and on size reductions.
    pub max_iterations: u32,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            output_format: WEBP_MIME.to_string(),
            max_dimension: 1024,
            target_bytes: 400 * 1024,
            min_quality: 0.55,
            max_iterations: 8,
        }
    }
}

impl EncodingOptions {
    /// Reject values outside their valid domains.
    ///
    /// Runs before any processing starts so a bad option never reaches the
    /// decode or encode stages.
    pub fn validate(&self) -> Result<(), ProcessError> {
        if self.max_dimension < 1 {
            return Err(ProcessError::InvalidOptions(
                "maxDimension must be at least 1".to_string(),
            ));
        }
        if self.target_bytes < 1 {
            return Err(ProcessError::InvalidOptions(
                "targetBytes must be at least 1".to_string(),
            ));
        }
        if !(self.min_quality > 0.0 && self.min_quality < 1.0) {
            return Err(ProcessError::InvalidOptions(
                "minQuality must be between 0 and 1, exclusive".to_string(),
            ));
        }
        if self.max_iterations < 1 {
            return Err(ProcessError::InvalidOptions(
                "maxIterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
