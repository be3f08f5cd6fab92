//! Encoder/decoder capability layer.
//!
//! The pipeline never talks to a concrete codec directly. Everything
//! platform-dependent (turning user-supplied bytes into a raster, turning
//! a rendered raster back into encoded bytes) sits behind the
//! [`ImageCodec`] trait, so the search loop runs unchanged against the
//! default [`NativeCodec`] backend or against the scripted fake used in
//! tests.
//!
//! # Decode strategy
//!
//! Decoding uses a two-path strategy:
//!
//! - **Fast path**: trust the file's declared media type and hand the bytes
//!   straight to that format's decoder.
//! - **Fallback path**: sniff the actual byte content to pick a decoder,
//!   for files whose declared type is wrong or unhelpful.
//!
//! [`decode_source`] tries the fast path first and falls back
//! automatically; only when both fail is the file rejected.
//!
//! # Format negotiation
//!
//! An encoder may not support the preferred output format, and some
//! backends substitute a different format rather than failing. Support is
//! therefore established empirically: [`resolve_output_format`] runs a
//! trivial 1x1 encode per candidate and checks the type the backend
//! reports back. The probe runs once per pipeline invocation, not once per
//! iteration.

mod native;

pub use native::NativeCodec;

use std::fmt;

use thiserror::Error;

use crate::file::InputFile;
use crate::options::JPEG_MIME;
use crate::raster::Raster;

/// Errors reported by codec backends.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The backend has no encoder or decoder for this media type.
    #[error("unsupported media type: {media_type}")]
    Unsupported { media_type: String },

    /// The bytes could not be decoded as an image.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Encoding the raster failed.
    #[error("encode failed: {0}")]
    Encode(String),
}

/// An encoded image returned by a backend.
///
/// `media_type` is the type the encoder actually produced, which may differ
/// from the requested type when the backend substitutes a format it
/// supports.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A decoded raster source owned by a single pipeline invocation.
///
/// Backends may attach a disposal hook for whatever temporary resource
/// mediated the decode. The hook runs exactly once: either through an
/// explicit [`SourceImage::dispose`] call or when the handle is dropped,
/// so release is guaranteed on every exit path, including early returns
/// and errors.
pub struct SourceImage {
    raster: Raster,
    on_dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl SourceImage {
    pub fn new(raster: Raster) -> Self {
        Self {
            raster,
            on_dispose: None,
        }
    }

    /// Attach a hook that runs when the source is disposed.
    pub fn with_disposer(raster: Raster, hook: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            raster,
            on_dispose: Some(hook),
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Release the source explicitly. Equivalent to dropping the handle.
    pub fn dispose(self) {}
}

impl Drop for SourceImage {
    fn drop(&mut self) {
        if let Some(hook) = self.on_dispose.take() {
            hook();
        }
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Platform codec capability consumed by the pipeline.
pub trait ImageCodec {
    /// Decode using the declared media type as a format hint.
    fn decode_fast(&self, bytes: &[u8], media_type: &str) -> Result<SourceImage, CodecError>;

    /// Decode by sniffing the byte content, ignoring the declared type.
    fn decode_fallback(&self, bytes: &[u8]) -> Result<SourceImage, CodecError>;

    /// Encode `raster` into `media_type` at `quality` in `(0, 1]`.
    fn encode(
        &self,
        raster: &Raster,
        media_type: &str,
        quality: f64,
    ) -> Result<EncodedImage, CodecError>;
}

/// Decode `file` with the fast declared-type path, falling back to content
/// sniffing when that fails. The error of the fallback attempt is the one
/// reported.
pub fn decode_source(codec: &dyn ImageCodec, file: &InputFile) -> Result<SourceImage, CodecError> {
    match codec.decode_fast(&file.bytes, &file.media_type) {
        Ok(source) => Ok(source),
        Err(_) => codec.decode_fallback(&file.bytes),
    }
}

/// Quality used for the 1x1 encoder support probes.
const PROBE_QUALITY: f64 = 0.9;

/// Check whether `codec` can actually produce `media_type` by running a
/// trivial encode and comparing the type it reports back.
pub fn encoder_supports(codec: &dyn ImageCodec, media_type: &str) -> bool {
    let probe = Raster::solid(1, 1, [0, 0, 0]);
    match codec.encode(&probe, media_type, PROBE_QUALITY) {
        Ok(encoded) => encoded.media_type == media_type,
        Err(_) => false,
    }
}

/// Resolve the output format for one pipeline run.
///
/// Prefers the requested type, then JPEG as the universal fallback. When
/// neither probe succeeds the requested type is returned unchanged and the
/// encode calls that follow decide what actually happens.
pub fn resolve_output_format(codec: &dyn ImageCodec, requested: &str) -> String {
    if encoder_supports(codec, requested) {
        return requested.to_string();
    }
    if encoder_supports(codec, JPEG_MIME) {
        return JPEG_MIME.to_string();
    }
    requested.to_string()
}
