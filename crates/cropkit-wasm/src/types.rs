//! WASM-compatible wrapper types for processed payloads.

use cropkit_core::ProcessedFile;
use wasm_bindgen::prelude::*;

/// A processed upload payload exposed to JavaScript.
///
/// Wraps the core `ProcessedFile` and hands JavaScript everything needed to
/// build a `File` for a multipart upload: encoded bytes, the media type the
/// encoder actually produced, the derived filename, and a modification
/// timestamp in epoch milliseconds.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory; `bytes()` copies them out as a
/// `Uint8Array`. Dropping the object (or letting wasm-bindgen's finalizer
/// collect it) releases the WASM-side buffer.
#[wasm_bindgen]
pub struct JsProcessedFile {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
    modified_ms: u64,
}

#[wasm_bindgen]
impl JsProcessedFile {
    /// Derived filename: original base name plus the produced extension
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    /// Media type of the encoded payload
    #[wasm_bindgen(getter)]
    pub fn media_type(&self) -> String {
        self.media_type.clone()
    }

    /// Number of encoded bytes
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Modification timestamp, milliseconds since the Unix epoch
    #[wasm_bindgen(getter)]
    pub fn modified_ms(&self) -> f64 {
        self.modified_ms as f64
    }

    /// Returns a copy of the encoded bytes as a `Uint8Array`.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl JsProcessedFile {
    /// Internal constructor used by the process binding.
    pub(crate) fn from_processed(file: ProcessedFile) -> Self {
        Self {
            file_name: file.file_name,
            media_type: file.media_type,
            bytes: file.bytes,
            modified_ms: file.modified_ms,
        }
    }
}
