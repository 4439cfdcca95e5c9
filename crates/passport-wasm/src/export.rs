//! Download naming helpers.

use passport_core::export::ExportFormat;
use wasm_bindgen::prelude::*;

fn parse(format: &str) -> Result<ExportFormat, JsValue> {
    format.parse().map_err(|e: String| JsValue::from_str(&e))
}

/// `passport_photos.<ext>` for `"png"`, `"jpeg"` or `"pdf"`.
#[wasm_bindgen]
pub fn export_file_name(format: &str) -> Result<String, JsValue> {
    parse(format).map(ExportFormat::file_name)
}

/// MIME type for the download `Blob`.
#[wasm_bindgen]
pub fn export_mime_type(format: &str) -> Result<String, JsValue> {
    parse(format).map(|f| f.mime_type().to_string())
}
