//! Cropkit WASM - WebAssembly bindings for Cropkit
//!
//! This crate exposes the cropkit-core upload-preparation pipeline to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `process` - The pipeline entry point (`process_image`)
//! - `types` - WASM-compatible wrapper types for the processed payload
//!
//! # Usage
//!
//! ```typescript
//! import init, { process_image } from '@cropkit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const processed = process_image(
//!   bytes,
//!   file.name,
//!   file.type,
//!   { x: 120, y: 80, width: 960, height: 960 },
//!   { targetBytes: 200 * 1024 },
//! );
//!
//! const upload = new File([processed.bytes()], processed.file_name, {
//!   type: processed.media_type,
//!   lastModified: processed.modified_ms,
//! });
//! ```

use wasm_bindgen::prelude::*;

mod process;
mod types;

pub use process::process_image;
pub use types::JsProcessedFile;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
