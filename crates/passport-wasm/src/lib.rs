//! Passport WASM - WebAssembly bindings for the passport photo maker
//!
//! This crate exposes the passport-core workflow to JavaScript. The page
//! keeps the DOM, the file input and the image-service call; everything
//! else (fit, crop gestures, previews, the print page and exports) runs here.
//!
//! # Module Structure
//!
//! - `session` - The select → crop → edit workflow
//! - `types` - WASM-compatible wrapper types for image data
//! - `export` - Download file naming
//!
//! # Usage
//!
//! ```typescript
//! import init, { PassportSession, export_file_name } from '@passport/wasm';
//!
//! await init();
//!
//! const session = new PassportSession({ container: { width: 800, height: 450 } });
//! if (session.select_image(new Uint8Array(await file.arrayBuffer()))) {
//!   const preview = session.preview();
//!   ctx.putImageData(new ImageData(preview.rgba(), preview.width, preview.height), 0, 0);
//! }
//! ```

use wasm_bindgen::prelude::*;

mod export;
mod session;
mod types;

pub use export::{export_file_name, export_mime_type};
pub use session::PassportSession;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
