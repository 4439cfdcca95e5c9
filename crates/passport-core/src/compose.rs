//! Print page composition: tile copies of the final photo on a white page.
//!
//! Copies are placed left to right, top to bottom, starting at
//! `(margin, margin)` with `margin` pixels between neighbours. A row wraps
//! when the next copy would cross the right edge, and placement stops at the
//! first copy that would cross the bottom edge. Copies that do not fit are
//! dropped; none is ever clipped. A copy larger than the page leaves the page
//! blank.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{self, DecodeError, DecodedImage, FilterType};
use crate::units::{cm_to_px, A4_HEIGHT_CM, A4_WIDTH_CM, PRINT_DPI};

/// Fewest copies the layout accepts.
pub const MIN_COPIES: u32 = 1;

/// Most copies the layout accepts.
pub const MAX_COPIES: u32 = 30;

const PAGE_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Errors from composing a page.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Photo has no pixels")]
    EmptySource,

    #[error("Invalid photo size {width_cm}x{height_cm} cm")]
    InvalidPhotoSize { width_cm: f64, height_cm: f64 },

    #[error("Invalid page size {width_cm}x{height_cm} cm")]
    InvalidPageSize { width_cm: f64, height_cm: f64 },

    #[error("Resampling failed: {0}")]
    Resample(#[from] DecodeError),
}

/// Physical page the copies are printed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: f64,
    /// Gap between copies and around the page edge, in page pixels.
    pub margin_px: u32,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            width_cm: A4_WIDTH_CM,
            height_cm: A4_HEIGHT_CM,
            dpi: PRINT_DPI,
            margin_px: 10,
        }
    }
}

impl PageSpec {
    /// Page raster size (2480x3508 for A4 at 300 DPI).
    pub fn dimensions(&self) -> (u32, u32) {
        (
            cm_to_px(self.width_cm, self.dpi),
            cm_to_px(self.height_cm, self.dpi),
        )
    }
}

/// User-adjustable copy size and count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayoutConfig {
    pub width_cm: f64,
    pub height_cm: f64,
    pub copies: u32,
}

impl Default for PageLayoutConfig {
    fn default() -> Self {
        Self {
            width_cm: 3.5,
            height_cm: 4.5,
            copies: 8,
        }
    }
}

impl PageLayoutConfig {
    /// Requested copy count clamped to `MIN_COPIES..=MAX_COPIES`.
    pub fn effective_copies(&self) -> u32 {
        self.copies.clamp(MIN_COPIES, MAX_COPIES)
    }

    /// Pixel size of one copy at `dpi`.
    pub fn photo_dimensions(&self, dpi: f64) -> (u32, u32) {
        (cm_to_px(self.width_cm, dpi), cm_to_px(self.height_cm, dpi))
    }
}

/// Top-left corners of every copy that fits, in placement order.
pub fn layout_positions(
    page_width: u32,
    page_height: u32,
    photo_width: u32,
    photo_height: u32,
    margin: u32,
    copies: u32,
) -> Vec<(u32, u32)> {
    let mut positions = Vec::new();
    if photo_width == 0 || photo_height == 0 {
        return positions;
    }

    // u64 so large margins cannot overflow
    let (page_w, page_h) = (page_width as u64, page_height as u64);
    let (photo_w, photo_h) = (photo_width as u64, photo_height as u64);
    let margin = margin as u64;

    let mut x = margin;
    let mut y = margin;
    for _ in 0..copies {
        if y + photo_h > page_h || x + photo_w > page_w {
            break;
        }
        positions.push((x as u32, y as u32));

        x += photo_w + margin;
        if x + photo_w > page_w {
            x = margin;
            y += photo_h + margin;
        }
    }
    positions
}

/// Render the print page for `photo` with the given layout.
pub fn compose_page(
    photo: &DecodedImage,
    layout: &PageLayoutConfig,
    page: &PageSpec,
) -> Result<DecodedImage, ComposeError> {
    if photo.is_empty() {
        return Err(ComposeError::EmptySource);
    }
    let (page_w, page_h) = page.dimensions();
    if page_w == 0 || page_h == 0 {
        return Err(ComposeError::InvalidPageSize {
            width_cm: page.width_cm,
            height_cm: page.height_cm,
        });
    }
    let (photo_w, photo_h) = layout.photo_dimensions(page.dpi);
    if photo_w == 0 || photo_h == 0 {
        return Err(ComposeError::InvalidPhotoSize {
            width_cm: layout.width_cm,
            height_cm: layout.height_cm,
        });
    }

    let positions = layout_positions(
        page_w,
        page_h,
        photo_w,
        photo_h,
        page.margin_px,
        layout.effective_copies(),
    );
    let mut canvas = DecodedImage::filled(page_w, page_h, PAGE_BACKGROUND);

    // Resample only once a copy is known to fit
    if !positions.is_empty() {
        let copy = decode::resize(photo, photo_w, photo_h, FilterType::Lanczos3)?;
        for &(x, y) in &positions {
            blit(&mut canvas, &copy, x, y);
        }
    }

    tracing::debug!(
        requested = layout.copies,
        placed = positions.len(),
        page_w,
        page_h,
        "page composed"
    );
    Ok(canvas)
}

/// Copy `src` onto `dst` with its top-left corner at `(x, y)`.
///
/// Rows or columns past the edge of `dst` are skipped.
fn blit(dst: &mut DecodedImage, src: &DecodedImage, x: u32, y: u32) {
    if x >= dst.width || y >= dst.height {
        return;
    }
    let copy_w = src.width.min(dst.width - x) as usize;
    let copy_h = src.height.min(dst.height - y) as usize;

    let src_stride = src.width as usize * 3;
    let dst_stride = dst.width as usize * 3;
    let row_bytes = copy_w * 3;

    for row in 0..copy_h {
        let src_start = row * src_stride;
        let dst_start = (y as usize + row) * dst_stride + x as usize * 3;
        dst.pixels[dst_start..dst_start + row_bytes]
            .copy_from_slice(&src.pixels[src_start..src_start + row_bytes]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_a4_layout_dimensions() {
        let page = PageSpec::default();
        assert_eq!(page.dimensions(), (2480, 3508));
        assert_eq!(PageLayoutConfig::default().photo_dimensions(page.dpi), (413, 531));
    }

    #[test]
    fn test_five_per_row_on_a4() {
        let positions = layout_positions(2480, 3508, 413, 531, 10, 8);
        assert_eq!(positions.len(), 8);
        assert_eq!(
            &positions[..6],
            &[(10, 10), (433, 10), (856, 10), (1279, 10), (1702, 10), (10, 551)]
        );
    }

    #[test]
    fn test_a4_holds_thirty() {
        let positions = layout_positions(2480, 3508, 413, 531, 10, 30);
        assert_eq!(positions.len(), 30);
        assert_eq!(positions[29], (1702, 2715));

        // A 31st request still only places 30
        assert_eq!(layout_positions(2480, 3508, 413, 531, 10, 31).len(), 30);
    }

    #[test]
    fn test_excess_copies_are_omitted() {
        // 3 per row, 2 rows fit
        let positions = layout_positions(1000, 1000, 300, 400, 10, 9);
        assert_eq!(
            positions,
            vec![(10, 10), (320, 10), (630, 10), (10, 420), (320, 420), (630, 420)]
        );
    }

    #[test]
    fn test_photo_wider_than_page_places_nothing() {
        assert!(layout_positions(400, 2000, 413, 531, 10, 8).is_empty());
        assert!(layout_positions(2000, 500, 413, 531, 10, 8).is_empty());
        assert!(layout_positions(2000, 2000, 0, 531, 10, 8).is_empty());
    }

    #[test]
    fn test_copies_are_clamped() {
        let mut layout = PageLayoutConfig::default();
        layout.copies = 0;
        assert_eq!(layout.effective_copies(), 1);
        layout.copies = 99;
        assert_eq!(layout.effective_copies(), 30);
    }

    #[test]
    fn test_compose_page_draws_copies_on_white() {
        let page = PageSpec {
            width_cm: 2.54,
            height_cm: 2.54,
            dpi: 100.0,
            margin_px: 10,
        };
        let layout = PageLayoutConfig {
            width_cm: 0.762, // 30 px at 100 DPI
            height_cm: 1.016, // 40 px
            copies: 2,
        };
        let photo = DecodedImage::filled(7, 9, [200, 0, 0]);

        let out = compose_page(&photo, &layout, &page).unwrap();
        assert_eq!((out.width, out.height), (100, 100));

        let px = |x: usize, y: usize| {
            let i = (y * 100 + x) * 3;
            [out.pixels[i], out.pixels[i + 1], out.pixels[i + 2]]
        };
        assert_eq!(px(0, 0), [255, 255, 255]);
        assert_eq!(px(10, 10), [200, 0, 0]);
        assert_eq!(px(39, 49), [200, 0, 0]);
        assert_eq!(px(45, 20), [255, 255, 255]);
        assert_eq!(px(50, 20), [200, 0, 0]);
        // Second row would start at y=60 but only two copies were requested
        assert_eq!(px(20, 70), [255, 255, 255]);
    }

    #[test]
    fn test_compose_page_rejects_empty_inputs() {
        let page = PageSpec::default();
        let empty = DecodedImage::new(0, 0, vec![]);
        assert!(matches!(
            compose_page(&empty, &PageLayoutConfig::default(), &page),
            Err(ComposeError::EmptySource)
        ));

        let photo = DecodedImage::filled(4, 4, [0, 0, 0]);
        let layout = PageLayoutConfig {
            width_cm: 0.0,
            ..PageLayoutConfig::default()
        };
        assert!(matches!(
            compose_page(&photo, &layout, &page),
            Err(ComposeError::InvalidPhotoSize { .. })
        ));
    }

    #[test]
    fn test_copy_larger_than_page_gives_blank_page() {
        let photo = DecodedImage::filled(8, 8, [20, 40, 60]);
        let layout = PageLayoutConfig {
            width_cm: 400.0,
            height_cm: 400.0,
            copies: 8,
        };
        let page = PageSpec::default();

        let out = compose_page(&photo, &layout, &page).unwrap();
        assert_eq!((out.width, out.height), (2480, 3508));
        assert!(out.pixels.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_blit_skips_out_of_bounds() {
        let mut dst = DecodedImage::filled(4, 4, [0, 0, 0]);
        let src = DecodedImage::filled(3, 3, [9, 9, 9]);
        blit(&mut dst, &src, 2, 2);
        assert_eq!(dst.pixels.iter().filter(|&&v| v == 9).count(), 4 * 3);
        blit(&mut dst, &src, 4, 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every placed copy lies fully inside the page.
        #[test]
        fn prop_no_copy_is_clipped(
            page_w in 1u32..4000,
            page_h in 1u32..4000,
            photo_w in 1u32..1000,
            photo_h in 1u32..1000,
            margin in 0u32..50,
            copies in 1u32..=30,
        ) {
            let positions = layout_positions(page_w, page_h, photo_w, photo_h, margin, copies);
            prop_assert!(positions.len() <= copies as usize);
            for (x, y) in positions {
                prop_assert!(x + photo_w <= page_w);
                prop_assert!(y + photo_h <= page_h);
            }
        }

        /// Property: copies never overlap.
        #[test]
        fn prop_copies_do_not_overlap(
            photo_w in 1u32..600,
            photo_h in 1u32..600,
            margin in 0u32..30,
            copies in 1u32..=30,
        ) {
            let positions = layout_positions(2480, 3508, photo_w, photo_h, margin, copies);
            for (i, a) in positions.iter().enumerate() {
                for b in &positions[i + 1..] {
                    let separate_x = a.0 + photo_w <= b.0 || b.0 + photo_w <= a.0;
                    let separate_y = a.1 + photo_h <= b.1 || b.1 + photo_h <= a.1;
                    prop_assert!(separate_x || separate_y);
                }
            }
        }

        /// Property: the layout is deterministic.
        #[test]
        fn prop_layout_is_deterministic(
            photo_w in 1u32..600,
            photo_h in 1u32..600,
            copies in 1u32..=30,
        ) {
            prop_assert_eq!(
                layout_positions(2480, 3508, photo_w, photo_h, 10, copies),
                layout_positions(2480, 3508, photo_w, photo_h, 10, copies)
            );
        }
    }
}
