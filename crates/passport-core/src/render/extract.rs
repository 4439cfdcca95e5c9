//! Sub-pixel sampling of a source-space rectangle.

use crate::decode::{self, DecodeError, DecodedImage, FilterType};
use crate::geometry::SourceRect;

/// Sample the pixels under `rect` into a `width` x `height` raster.
///
/// The fractional rectangle is sampled as is, so the output covers exactly
/// the requested area even when it spans only a few source pixels. Areas
/// larger than the output are first shrunk with `filter` to about the output
/// size; the last step is a bilinear sample over fractional coordinates.
/// The rectangle is clamped to the image.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero output size or an empty
/// source and `DecodeError::CorruptedFile` if the pixel buffer does not match
/// the declared dimensions.
pub fn sample_region(
    image: &DecodedImage,
    rect: &SourceRect,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 || image.width == 0 || image.height == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if image.pixels.len() != image.width as usize * image.height as usize * 3 {
        return Err(DecodeError::CorruptedFile(
            "Pixel buffer size mismatch".to_string(),
        ));
    }

    let (x0, x1) = clamp_span(rect.x, rect.width, image.width);
    let (y0, y1) = clamp_span(rect.y, rect.height, image.height);
    let window = PixelWindow::enclosing(image, (x0, x1), (y0, y1));
    let region = window.crop(image);

    // Rectangle relative to the window origin
    let mut area = SourceRect {
        x: x0 - window.left as f64,
        y: y0 - window.top as f64,
        width: x1 - x0,
        height: y1 - y0,
    };

    let shrunk_w = shrink_target(window.width, area.width, width);
    let shrunk_h = shrink_target(window.height, area.height, height);
    let source = if shrunk_w < window.width || shrunk_h < window.height {
        let fx = shrunk_w as f64 / window.width as f64;
        let fy = shrunk_h as f64 / window.height as f64;
        area = SourceRect {
            x: area.x * fx,
            y: area.y * fy,
            width: area.width * fx,
            height: area.height * fy,
        };
        decode::resize(&region, shrunk_w, shrunk_h, filter)?
    } else {
        region
    };

    Ok(bilinear(&source, &area, width, height))
}

/// Clamp `start..start + len` to `0..limit`.
fn clamp_span(start: f64, len: f64, limit: u32) -> (f64, f64) {
    let limit = limit as f64;
    let lo = start.clamp(0.0, limit);
    let hi = (start + len).clamp(lo, limit);
    (lo, hi)
}

/// Window length after shrinking so that `rect_len` spans about `out_len`.
fn shrink_target(window_len: u32, rect_len: f64, out_len: u32) -> u32 {
    if rect_len <= out_len as f64 {
        return window_len;
    }
    let scale = out_len as f64 / rect_len;
    ((window_len as f64 * scale).ceil() as u32).clamp(1, window_len)
}

/// Whole-pixel window enclosing a fractional span on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelWindow {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl PixelWindow {
    fn enclosing(image: &DecodedImage, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> Self {
        let left = (x0.floor() as u32).min(image.width - 1);
        let top = (y0.floor() as u32).min(image.height - 1);
        let right = (x1.ceil() as u32).clamp(left + 1, image.width);
        let bottom = (y1.ceil() as u32).clamp(top + 1, image.height);
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    fn crop(&self, image: &DecodedImage) -> DecodedImage {
        if self.left == 0
            && self.top == 0
            && self.width == image.width
            && self.height == image.height
        {
            return image.clone();
        }

        let stride = image.width as usize * 3;
        let row_bytes = self.width as usize * 3;
        let mut output = Vec::with_capacity(row_bytes * self.height as usize);
        for y in self.top..self.top + self.height {
            let start = y as usize * stride + self.left as usize * 3;
            output.extend_from_slice(&image.pixels[start..start + row_bytes]);
        }
        DecodedImage::new(self.width, self.height, output)
    }
}

/// Neighbouring pixel indices and blend weight for one output coordinate.
#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    t: f64,
}

impl Tap {
    /// `coord` is in pixel-centre space: pixel `i` sits at `i`.
    fn new(coord: f64, len: u32) -> Self {
        let last = len.saturating_sub(1) as usize;
        let c = coord.clamp(0.0, last as f64);
        let lo = c.floor();
        Self {
            lo: lo as usize,
            hi: (lo as usize + 1).min(last),
            t: c - lo,
        }
    }

    /// Tap for output index `i` of `count` spread over `start..start + len`.
    fn along(start: f64, len: f64, i: u32, count: u32, src_len: u32) -> Self {
        Self::new(start + (i as f64 + 0.5) * (len / count as f64) - 0.5, src_len)
    }
}

fn lerp(a: u8, b: u8, t: f64) -> f64 {
    a as f64 + (b as f64 - a as f64) * t
}

fn bilinear(src: &DecodedImage, area: &SourceRect, out_w: u32, out_h: u32) -> DecodedImage {
    let columns: Vec<Tap> = (0..out_w)
        .map(|i| Tap::along(area.x, area.width, i, out_w, src.width))
        .collect();
    let stride = src.width as usize * 3;
    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize * 3);

    for j in 0..out_h {
        let row = Tap::along(area.y, area.height, j, out_h, src.height);
        let upper = &src.pixels[row.lo * stride..(row.lo + 1) * stride];
        let lower = &src.pixels[row.hi * stride..(row.hi + 1) * stride];
        for col in &columns {
            for c in 0..3 {
                let top = lerp(upper[col.lo * 3 + c], upper[col.hi * 3 + c], col.t);
                let bottom = lerp(lower[col.lo * 3 + c], lower[col.hi * 3 + c], col.t);
                let value = top + (bottom - top) * row.t;
                pixels.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    DecodedImage::new(out_w, out_h, pixels)
}
