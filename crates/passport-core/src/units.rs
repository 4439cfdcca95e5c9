//! Physical-size to pixel conversions for print output.

/// Print resolution used for the final crop and the page raster.
pub const PRINT_DPI: f64 = 300.0;

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Millimetres per centimetre.
pub const MM_PER_CM: f64 = 10.0;

/// A4 page width in centimetres.
pub const A4_WIDTH_CM: f64 = 21.0;

/// A4 page height in centimetres.
pub const A4_HEIGHT_CM: f64 = 29.7;

/// Convert a physical length to whole pixels at `dpi`.
///
/// `3.5 cm` at 300 DPI is 413 px and `4.5 cm` is 531 px.
#[inline]
pub fn cm_to_px(cm: f64, dpi: f64) -> u32 {
    let px = (cm / CM_PER_INCH * dpi).round();
    if px.is_finite() && px > 0.0 {
        px as u32
    } else {
        0
    }
}

/// Convert a pixel length at `dpi` back to millimetres.
#[inline]
pub fn px_to_mm(px: u32, dpi: f64) -> f64 {
    px as f64 / dpi * CM_PER_INCH * MM_PER_CM
}
