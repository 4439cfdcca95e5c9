//! Device-independent pointer events for the crop gestures.
//!
//! Mouse and touch input are both translated into [`PointerEvent`] at the
//! binding boundary, so the gesture state machine never sees which device
//! produced them. Positions are container-relative screen pixels.

use serde::{Deserialize, Serialize};

use super::types::{CropBox, Handle};
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Down,
            position: Point::new(x, y),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Up,
            position: Point::new(x, y),
        }
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    Body,
    Handle(Handle),
}

/// Resolve a pointer position against the crop box.
///
/// Handles win over the body since they straddle the box edge.
pub fn hit_test(crop_box: &CropBox, p: Point, handle_radius: f64) -> Option<HitTarget> {
    let radius_sq = handle_radius * handle_radius;
    let handle = Handle::ALL.into_iter().find(|&handle| {
        let corner = crop_box.corner(handle);
        let dx = p.x - corner.x;
        let dy = p.y - corner.y;
        dx * dx + dy * dy <= radius_sq
    });

    match handle {
        Some(handle) => Some(HitTarget::Handle(handle)),
        None if crop_box.contains_point(p) => Some(HitTarget::Body),
        None => None,
    }
}
