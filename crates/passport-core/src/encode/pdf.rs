//! Single-page PDF export of a composed print page.

use std::io::BufWriter;

use printpdf::{Image, ImageTransform, Mm, PdfDocument};

use super::types::{validate_rgb, EncodeError};
use crate::compose::PageSpec;
use crate::units::{px_to_mm, MM_PER_CM};

const DOCUMENT_TITLE: &str = "Passport Photos";

/// Embed an RGB page raster on a single PDF page sized to `page`.
///
/// The raster is placed at the page origin and scaled so it covers the whole
/// page, which absorbs the sub-millimetre error from rounding the page to
/// whole pixels.
pub fn encode_pdf_page(
    pixels: &[u8],
    width: u32,
    height: u32,
    page: &PageSpec,
) -> Result<Vec<u8>, EncodeError> {
    validate_rgb(pixels, width, height)?;

    let page_w_mm = page.width_cm * MM_PER_CM;
    let page_h_mm = page.height_cm * MM_PER_CM;

    let (doc, page_index, layer_index) = PdfDocument::new(
        DOCUMENT_TITLE,
        Mm(page_w_mm as f32),
        Mm(page_h_mm as f32),
        "Layer 1",
    );
    let layer = doc.get_page(page_index).get_layer(layer_index);

    let raster = printpdf::image_crate::RgbImage::from_raw(width, height, pixels.to_vec())
        .ok_or_else(|| EncodeError::EncodingFailed {
            format: "PDF",
            message: "pixel buffer rejected by PDF image encoder".to_string(),
        })?;
    let pdf_image =
        Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(raster));

    let natural_w_mm = px_to_mm(width, page.dpi);
    let natural_h_mm = px_to_mm(height, page.dpi);
    let transform = ImageTransform {
        translate_x: Some(Mm(0.0)),
        translate_y: Some(Mm(0.0)),
        rotate: None,
        scale_x: Some((page_w_mm / natural_w_mm) as f32),
        scale_y: Some((page_h_mm / natural_h_mm) as f32),
        dpi: Some(page.dpi as f32),
    };
    pdf_image.add_to_layer(layer, transform);

    let mut buffer = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buffer);
        doc.save(&mut writer)
            .map_err(|e| EncodeError::EncodingFailed {
                format: "PDF",
                message: e.to_string(),
            })?;
    }
    Ok(buffer)
}
