//! Cropkit Core - Image preparation pipeline
//!
//! This crate turns a user-selected image, a crop rectangle from an
//! interactive crop UI, and a set of [`EncodingOptions`] into a named
//! payload that fits an upload byte budget:
//!
//! 1. Decode the file into an owned raster source (declared-type fast
//!    path, content-sniffing fallback, EXIF orientation applied).
//! 2. Clamp the crop rectangle to the source bounds.
//! 3. Negotiate the output format against the encoder (WebP preferred,
//!    JPEG fallback), probed once per run.
//! 4. Render the crop at decreasing sizes and qualities until the encoded
//!    result fits the budget, keeping the best effort otherwise.
//! 5. Package the winning bytes under the original base name with the
//!    produced format's extension.
//!
//! Codecs sit behind the [`ImageCodec`] trait; [`NativeCodec`] is the
//! default backend built on the `image` crate and libwebp. All operations
//! are synchronous and single-threaded, and each invocation exclusively
//! owns its decoded source and render surfaces.

pub mod codec;
pub mod crop;
pub mod error;
pub mod file;
pub mod options;
pub mod pipeline;
pub mod raster;

pub use codec::{ImageCodec, NativeCodec};
pub use crop::{CropRect, CropRegion};
pub use error::ProcessError;
pub use file::{InputFile, ProcessedFile};
pub use options::{EncodingOptions, JPEG_MIME, PNG_MIME, WEBP_MIME};
pub use pipeline::process_upload;
pub use raster::Raster;
