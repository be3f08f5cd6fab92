//! Pipeline entry point exposed to JavaScript.

use cropkit_core::{process_upload, CropRect, EncodingOptions, InputFile, NativeCodec};
use wasm_bindgen::prelude::*;

use crate::types::JsProcessedFile;

/// Process a user-selected image for upload.
///
/// Decodes the file, applies the crop, and re-encodes at decreasing
/// quality/size until the result fits the configured byte budget.
///
/// # Arguments
///
/// * `bytes` - The raw file bytes as a `Uint8Array`
/// * `file_name` - The original filename (used to derive the output name)
/// * `media_type` - The declared media type (`File.type`)
/// * `crop` - An object `{x, y, width, height}` in source-pixel
///   coordinates, as reported by the crop UI
/// * `options` - An optional, possibly partial options object
///   (`outputFormat`, `maxDimension`, `targetBytes`, `minQuality`,
///   `maxIterations`); missing fields take their defaults
///
/// # Returns
///
/// A [`JsProcessedFile`] with the encoded bytes, produced media type,
/// derived filename, and a fresh modification timestamp.
///
/// # Errors
///
/// Returns an error with a user-displayable message if the file is not an
/// image, the crop is missing, an option is out of range, the bytes cannot
/// be decoded, or encoding fails entirely.
///
/// # Example
///
/// ```typescript
/// const processed = process_image(
///   new Uint8Array(await file.arrayBuffer()),
///   file.name,
///   file.type,
///   { x: 0, y: 0, width: 3000, height: 3000 },
///   undefined,
/// );
/// console.log(`${processed.file_name}: ${processed.byte_length} bytes`);
/// ```
#[wasm_bindgen]
pub fn process_image(
    bytes: &[u8],
    file_name: &str,
    media_type: &str,
    crop: JsValue,
    options: JsValue,
) -> Result<JsProcessedFile, JsValue> {
    let crop = parse_crop(crop)?;
    let options = parse_options(options)?;

    let file = InputFile::new(file_name, media_type, bytes.to_vec());
    let codec = NativeCodec::new();

    let processed = process_upload(&codec, &file, crop, &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "cropkit: {} -> {} ({}, {} bytes)",
        file_name,
        processed.file_name,
        processed.media_type,
        processed.bytes.len(),
    )));

    Ok(JsProcessedFile::from_processed(processed))
}

/// A null or undefined crop maps to `None` so the pipeline can report the
/// missing-crop error itself.
fn parse_crop(value: JsValue) -> Result<Option<CropRect>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("invalid crop rectangle: {e}")))
}

fn parse_options(value: JsValue) -> Result<EncodingOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(EncodingOptions::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("invalid encoding options: {e}")))
}
