//! Crop render pipeline.
//!
//! Both render targets share one algorithm and differ only in output size
//! and resampling filter:
//!
//! 1. Take the crop box relative to the display origin.
//! 2. Scale it by `natural / display` into a source-pixel rectangle.
//! 3. Sample that rectangle, at sub-pixel precision, into the output raster.
//!
//! The output aspect ratio equals the crop box aspect ratio, so filling the
//! output never distorts the photo.

mod extract;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crop::CropBox;
use crate::decode::{self, DecodeError, DecodedImage, FilterType};
use crate::encode::{self, EncodeError};
use crate::geometry::CoordinateMapper;
use crate::units::{cm_to_px, PRINT_DPI};

pub use extract::sample_region;

/// Errors from rendering a crop.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Resampling failed: {0}")]
    Resample(#[from] DecodeError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Physical photo format and preview size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoSpec {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: f64,
    pub preview_width: u32,
    pub preview_height: u32,
}

impl Default for PhotoSpec {
    fn default() -> Self {
        Self {
            width_cm: 3.5,
            height_cm: 4.5,
            dpi: PRINT_DPI,
            preview_width: 105,
            preview_height: 135,
        }
    }
}

impl PhotoSpec {
    pub fn aspect_ratio(&self) -> f64 {
        self.width_cm / self.height_cm
    }

    /// Pixel size of the final crop (413x531 for the default spec).
    pub fn final_dimensions(&self) -> (u32, u32) {
        (
            cm_to_px(self.width_cm, self.dpi),
            cm_to_px(self.height_cm, self.dpi),
        )
    }

    pub fn preview_dimensions(&self) -> (u32, u32) {
        (self.preview_width, self.preview_height)
    }
}

/// Which output a render produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderTarget {
    /// Small live thumbnail, redrawn on every crop box change.
    Preview,
    /// Print-resolution crop, produced on confirm.
    Final,
}

impl RenderTarget {
    pub fn dimensions(self, spec: &PhotoSpec) -> (u32, u32) {
        match self {
            RenderTarget::Preview => spec.preview_dimensions(),
            RenderTarget::Final => spec.final_dimensions(),
        }
    }

    pub fn filter(self) -> FilterType {
        match self {
            RenderTarget::Preview => FilterType::Bilinear,
            RenderTarget::Final => FilterType::Lanczos3,
        }
    }
}

/// Render the source pixels under `crop_box` into a `width` x `height` raster.
pub fn render_crop(
    source: &DecodedImage,
    mapper: &CoordinateMapper,
    crop_box: &CropBox,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, RenderError> {
    let rect = mapper.screen_rect_to_source(crop_box.x, crop_box.y, crop_box.width, crop_box.height);
    Ok(sample_region(source, &rect, width, height, filter)?)
}

/// The confirmed passport photo: a PNG at print resolution.
///
/// Immutable once built; a new confirm or a background edit replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl FinalImage {
    pub const MIME_TYPE: &'static str = "image/png";

    /// Encode a raster as the final image.
    pub fn from_raster(raster: &DecodedImage) -> Result<Self, EncodeError> {
        let png = encode::encode_png(&raster.pixels, raster.width, raster.height)?;
        Ok(Self {
            png,
            width: raster.width,
            height: raster.height,
        })
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode back to RGB for page composition.
    pub fn decode(&self) -> Result<DecodedImage, DecodeError> {
        decode::decode_image(&self.png)
    }
}
