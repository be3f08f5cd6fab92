//! Input and output file payloads and filename derivation.

use serde::{Deserialize, Serialize};

use crate::codec::EncodedImage;
use crate::options::{JPEG_MIME, PNG_MIME, WEBP_MIME};

/// A user-selected file handed to the pipeline: raw bytes plus the name and
/// media type the platform reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Whether the declared media type marks this file as an image.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// The packaged pipeline output, ready for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// Original base name with the extension of the produced format.
    pub file_name: String,
    /// Media type of the encoded payload as the encoder reported it.
    pub media_type: String,
    pub bytes: Vec<u8>,
    /// Modification timestamp, milliseconds since the Unix epoch.
    pub modified_ms: u64,
}

impl ProcessedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Wrap an encoded payload into a named file.
///
/// The declared type is whatever the encoder actually produced, which may
/// differ from `negotiated_type` when the backend substituted a format; the
/// negotiated type is only used when the encoder reported none.
pub fn package(original_name: &str, encoded: EncodedImage, negotiated_type: &str) -> ProcessedFile {
    let media_type = if encoded.media_type.is_empty() {
        negotiated_type.to_string()
    } else {
        encoded.media_type
    };
    let file_name = derive_file_name(original_name, extension_for(&media_type));

    ProcessedFile {
        file_name,
        media_type,
        bytes: encoded.bytes,
        modified_ms: now_ms(),
    }
}

/// Strip any existing extension from `original_name` and append
/// `extension`. An empty or whitespace-only base name falls back to
/// `"image"`.
fn derive_file_name(original_name: &str, extension: &str) -> String {
    let base = strip_extension(original_name).trim();
    let base = if base.is_empty() { "image" } else { base };
    format!("{base}.{extension}")
}

/// Drop the final `.segment` of `name` when that segment is non-empty.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) if index + 1 < name.len() => &name[..index],
        _ => name,
    }
}

/// Map a media type to its canonical file extension.
///
/// Unknown image subtypes pass through as-is; a missing subtype defaults to
/// the JPEG extension.
fn extension_for(media_type: &str) -> &str {
    match media_type {
        WEBP_MIME => "webp",
        JPEG_MIME => "jpg",
        PNG_MIME => "png",
        _ => media_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .filter(|subtype| !subtype.is_empty())
            .unwrap_or("jpg"),
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// `SystemTime::now` is unavailable on wasm32-unknown-unknown; go through
/// the JS clock instead.
#[cfg(target_arch = "wasm32")]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}
