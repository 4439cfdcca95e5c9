//! Raster encoders for the crop outputs and page export.
//!
//! - PNG for the live preview, the final crop and PNG page export
//! - JPEG for JPEG page export
//! - PDF (feature `pdf`) embedding the composed page at full page size
//!
//! All encoders take RGB8 row-major buffers and validate them against the
//! declared dimensions before encoding.

mod jpeg;
#[cfg(feature = "pdf")]
mod pdf;
mod png;
mod types;

pub use jpeg::{encode_jpeg, DEFAULT_JPEG_QUALITY};
#[cfg(feature = "pdf")]
pub use pdf::encode_pdf_page;
pub use png::encode_png;
pub use types::EncodeError;
