//! Image decoding for the passport photo workflow.
//!
//! This module provides functionality for:
//! - Decoding the user's photo (JPEG or PNG) with EXIF orientation applied
//! - Exact-size resampling used by the render pipeline and page compositor
//!
//! All operations are synchronous and single-threaded, so they can run
//! directly inside UI event handlers when compiled to WASM.

mod resize;
mod source;
mod types;

pub use resize::resize;
pub use source::decode_image;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
