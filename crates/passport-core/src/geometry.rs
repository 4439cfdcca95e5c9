//! Screen/source coordinate mapping for the crop view.
//!
//! The source photo is shown contain-fitted (letterboxed) inside the crop
//! container. Two coordinate spaces are involved:
//!
//! - **Screen space**: container-relative layout pixels. Pointer positions,
//!   [`DisplayGeometry`] and the crop box all live here.
//! - **Source space**: pixels of the decoded photo.
//!
//! [`CoordinateMapper`] converts between the two for a given display fit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when fitting an image into a container.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The source image has no area.
    #[error("Image has no area ({width}x{height})")]
    EmptyImage { width: f64, height: f64 },

    /// The container has no area.
    #[error("Container has no area ({width}x{height})")]
    EmptyContainer { width: f64, height: f64 },
}

/// A width/height pair in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A position in either coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The rectangle, in container-relative screen pixels, occupied by the
/// displayed source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayGeometry {
    /// Contain-fit an image of `natural` size into `container`.
    ///
    /// If the image is relatively wider than the container, the width fills
    /// the container and the image is centered vertically; otherwise the
    /// height fills it and the image is centered horizontally.
    pub fn contain(natural: Size, container: Size) -> Result<Self, GeometryError> {
        if !natural.has_area() {
            return Err(GeometryError::EmptyImage {
                width: natural.width,
                height: natural.height,
            });
        }
        if !container.has_area() {
            return Err(GeometryError::EmptyContainer {
                width: container.width,
                height: container.height,
            });
        }

        let image_ratio = natural.aspect_ratio();
        let container_ratio = container.aspect_ratio();

        let geometry = if image_ratio > container_ratio {
            let width = container.width;
            let height = width / image_ratio;
            Self {
                left: 0.0,
                top: (container.height - height) / 2.0,
                width,
                height,
            }
        } else {
            let height = container.height;
            let width = height * image_ratio;
            Self {
                left: (container.width - width) / 2.0,
                top: 0.0,
                width,
                height,
            }
        };

        Ok(geometry)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

/// Pure transforms between screen space and source space for one fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    natural: Size,
    display: DisplayGeometry,
}

impl CoordinateMapper {
    /// Fit `natural` into `container` and build the mapper for that fit.
    pub fn fit(natural: Size, container: Size) -> Result<Self, GeometryError> {
        let display = DisplayGeometry::contain(natural, container)?;
        Ok(Self { natural, display })
    }

    pub fn natural(&self) -> Size {
        self.natural
    }

    pub fn display(&self) -> DisplayGeometry {
        self.display
    }

    /// Source pixels per screen pixel, horizontally.
    pub fn scale_x(&self) -> f64 {
        self.natural.width / self.display.width
    }

    /// Source pixels per screen pixel, vertically.
    pub fn scale_y(&self) -> f64 {
        self.natural.height / self.display.height
    }

    /// `source = (screen - display_origin) * (natural / display)`
    pub fn screen_to_source(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.display.left) * self.scale_x(),
            (p.y - self.display.top) * self.scale_y(),
        )
    }

    pub fn source_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x / self.scale_x() + self.display.left,
            p.y / self.scale_y() + self.display.top,
        )
    }

    /// Map a screen-space rectangle to source pixels.
    pub fn screen_rect_to_source(&self, x: f64, y: f64, width: f64, height: f64) -> SourceRect {
        let origin = self.screen_to_source(Point::new(x, y));
        SourceRect {
            x: origin.x,
            y: origin.y,
            width: width * self.scale_x(),
            height: height * self.scale_y(),
        }
    }
}

/// A rectangle in source-image pixels, possibly fractional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_wide_image_fills_width_and_centers_vertically() {
        let geo = DisplayGeometry::contain(Size::new(2000.0, 1000.0), Size::new(800.0, 450.0))
            .unwrap();
        assert_eq!(geo.width, 800.0);
        assert_eq!(geo.height, 400.0);
        assert_eq!(geo.top, 25.0);
        assert_eq!(geo.left, 0.0);
    }

    #[test]
    fn test_square_image_fills_height_and_centers_horizontally() {
        // 1.0 < 800/450, so the height is the constraint
        let geo = DisplayGeometry::contain(Size::new(1000.0, 1000.0), Size::new(800.0, 450.0))
            .unwrap();
        assert_eq!(geo.height, 450.0);
        assert_eq!(geo.width, 450.0);
        assert_eq!(geo.left, 175.0);
        assert_eq!(geo.top, 0.0);
    }

    #[test]
    fn test_equal_ratio_fills_container() {
        let geo =
            DisplayGeometry::contain(Size::new(1600.0, 900.0), Size::new(800.0, 450.0)).unwrap();
        assert!((geo.width - 800.0).abs() < EPS);
        assert!((geo.height - 450.0).abs() < EPS);
        assert!(geo.left.abs() < EPS);
        assert!(geo.top.abs() < EPS);
    }

    #[test]
    fn test_empty_dimensions_are_errors() {
        assert!(matches!(
            DisplayGeometry::contain(Size::new(0.0, 10.0), Size::new(800.0, 450.0)),
            Err(GeometryError::EmptyImage { .. })
        ));
        assert!(matches!(
            DisplayGeometry::contain(Size::new(10.0, 10.0), Size::new(800.0, 0.0)),
            Err(GeometryError::EmptyContainer { .. })
        ));
    }

    #[test]
    fn test_screen_to_source() {
        let mapper =
            CoordinateMapper::fit(Size::new(2000.0, 1000.0), Size::new(800.0, 450.0)).unwrap();

        let origin = mapper.screen_to_source(Point::new(0.0, 25.0));
        assert!(origin.x.abs() < EPS && origin.y.abs() < EPS);

        let corner = mapper.screen_to_source(Point::new(800.0, 425.0));
        assert!((corner.x - 2000.0).abs() < EPS);
        assert!((corner.y - 1000.0).abs() < EPS);
    }

    #[test]
    fn test_source_to_screen_is_inverse() {
        let mapper =
            CoordinateMapper::fit(Size::new(3024.0, 4032.0), Size::new(512.0, 450.0)).unwrap();
        let p = Point::new(200.5, 317.25);
        let back = mapper.source_to_screen(mapper.screen_to_source(p));
        assert!((back.x - p.x).abs() < 1e-6);
        assert!((back.y - p.y).abs() < 1e-6);
    }

    #[test]
    fn test_screen_rect_to_source() {
        let mapper =
            CoordinateMapper::fit(Size::new(2000.0, 1000.0), Size::new(800.0, 450.0)).unwrap();
        let rect = mapper.screen_rect_to_source(100.0, 125.0, 70.0, 90.0);
        assert!((rect.x - 250.0).abs() < EPS);
        assert!((rect.y - 250.0).abs() < EPS);
        assert!((rect.width - 175.0).abs() < EPS);
        assert!((rect.height - 225.0).abs() < EPS);
    }
}
