//! Crop box, corner handles and the passport-format constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{DisplayGeometry, Point};

/// Width / height of a passport photo (3.5 cm x 4.5 cm).
pub const PASSPORT_ASPECT_RATIO: f64 = 3.5 / 4.5;

/// Smallest crop box edge, in screen pixels, a resize may produce.
pub const MIN_CROP_SIZE: f64 = 20.0;

/// Fraction of the largest fitting box used for the initial crop box.
pub const DEFAULT_BOX_FRACTION: f64 = 0.8;

/// Hit radius of a corner handle, in screen pixels.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Slack for floating-point drift when checking containment.
const CONTAINMENT_EPSILON: f64 = 1e-6;

/// The crop selection, in the same screen space as [`DisplayGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The default selection: 80% of the largest `aspect_ratio` box that
    /// fits the displayed image, centered on it.
    pub fn centered_default(geometry: &DisplayGeometry, aspect_ratio: f64) -> Self {
        let width = geometry.width.min(geometry.height * aspect_ratio) * DEFAULT_BOX_FRACTION;
        let height = width / aspect_ratio;
        Self {
            x: geometry.left + (geometry.width - width) / 2.0,
            y: geometry.top + (geometry.height - height) / 2.0,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Screen position of a corner.
    pub fn corner(&self, handle: Handle) -> Point {
        let x = if handle.touches_west() {
            self.x
        } else {
            self.right()
        };
        let y = if handle.touches_north() {
            self.y
        } else {
            self.bottom()
        };
        Point::new(x, y)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Whether the box lies fully inside `bounds`.
    pub fn is_within(&self, bounds: &DisplayGeometry) -> bool {
        self.x >= bounds.left - CONTAINMENT_EPSILON
            && self.y >= bounds.top - CONTAINMENT_EPSILON
            && self.right() <= bounds.right() + CONTAINMENT_EPSILON
            && self.bottom() <= bounds.bottom() + CONTAINMENT_EPSILON
    }
}

/// A corner resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "se")]
    SouthEast,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthWest,
        Handle::SouthEast,
    ];

    pub fn touches_north(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::NorthEast)
    }

    pub fn touches_south(self) -> bool {
        !self.touches_north()
    }

    pub fn touches_west(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::SouthWest)
    }

    pub fn touches_east(self) -> bool {
        !self.touches_west()
    }

    /// The diagonally opposite corner, which stays fixed while resizing.
    pub fn opposite(self) -> Handle {
        match self {
            Handle::NorthWest => Handle::SouthEast,
            Handle::NorthEast => Handle::SouthWest,
            Handle::SouthWest => Handle::NorthEast,
            Handle::SouthEast => Handle::NorthWest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::NorthWest => "nw",
            Handle::NorthEast => "ne",
            Handle::SouthWest => "sw",
            Handle::SouthEast => "se",
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nw" => Ok(Handle::NorthWest),
            "ne" => Ok(Handle::NorthEast),
            "sw" => Ok(Handle::SouthWest),
            "se" => Ok(Handle::SouthEast),
            other => Err(format!("unknown handle '{other}'")),
        }
    }
}
