//! Crop box gesture state machine.
//!
//! The editor owns the crop box and, while a pointer is held, the gesture
//! that is modifying it. Every pointer move recomputes the box from the
//! gesture's starting box plus the total pointer delta, so rounding never
//! accumulates over a drag.
//!
//! Invariants after every update:
//! - `width / height` equals the configured aspect ratio
//! - the box lies inside the display geometry
//! - resizes never produce an edge of `MIN_CROP_SIZE` or less

use serde::{Deserialize, Serialize};

use super::pointer::{hit_test, HitTarget, PointerEvent, PointerPhase};
use super::types::{CropBox, Handle, HANDLE_RADIUS, MIN_CROP_SIZE};
use crate::geometry::{DisplayGeometry, Point};

/// What the active gesture does to the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKind {
    Move,
    Resize(Handle),
}

/// Transient state of an active pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub kind: GestureKind,
    pub start_pointer: Point,
    pub start_box: CropBox,
}

/// Observable state of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureState {
    Idle,
    DraggingMove,
    DraggingResize(Handle),
}

/// Translate `start` by the pointer delta, clamping each axis so the box
/// stays inside `bounds`.
pub fn move_box(start: &CropBox, dx: f64, dy: f64, bounds: &DisplayGeometry) -> CropBox {
    let max_x = bounds.right() - start.width;
    let max_y = bounds.bottom() - start.height;
    CropBox {
        x: (start.x + dx).min(max_x).max(bounds.left),
        y: (start.y + dy).min(max_y).max(bounds.top),
        ..*start
    }
}

/// Resize `start` by dragging `handle` by the pointer delta.
///
/// The touched edges move by the delta, the aspect ratio is re-imposed, and
/// the box is re-anchored on the corner opposite `handle`. Returns `None`
/// when the result would be too small or leave `bounds`.
pub fn resize_box(
    start: &CropBox,
    handle: Handle,
    dx: f64,
    dy: f64,
    bounds: &DisplayGeometry,
    aspect_ratio: f64,
    min_size: f64,
) -> Option<CropBox> {
    let mut width = start.width;
    let mut height = start.height;

    if handle.touches_east() {
        width += dx;
    }
    if handle.touches_west() {
        width -= dx;
    }
    if handle.touches_south() {
        height += dy;
    }
    if handle.touches_north() {
        height -= dy;
    }

    // Corner handles always touch a vertical edge, so width drives height.
    if handle.touches_west() || handle.touches_east() {
        height = width / aspect_ratio;
    } else {
        width = height * aspect_ratio;
    }

    let x = if handle.touches_west() {
        start.right() - width
    } else {
        start.x
    };
    let y = if handle.touches_north() {
        start.bottom() - height
    } else {
        start.y
    };

    let candidate = CropBox::new(x, y, width, height);
    (width > min_size && height > min_size && candidate.is_within(bounds)).then_some(candidate)
}

/// The crop box plus the gesture currently acting on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CropEditor {
    geometry: DisplayGeometry,
    aspect_ratio: f64,
    min_size: f64,
    crop_box: CropBox,
    interaction: Option<Interaction>,
}

impl CropEditor {
    /// Start editing over `geometry` with the centered default box.
    pub fn new(geometry: DisplayGeometry, aspect_ratio: f64) -> Self {
        Self {
            geometry,
            aspect_ratio,
            min_size: MIN_CROP_SIZE,
            crop_box: CropBox::centered_default(&geometry, aspect_ratio),
            interaction: None,
        }
    }

    pub fn crop_box(&self) -> CropBox {
        self.crop_box
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    pub fn state(&self) -> GestureState {
        match self.interaction.map(|i| i.kind) {
            None => GestureState::Idle,
            Some(GestureKind::Move) => GestureState::DraggingMove,
            Some(GestureKind::Resize(handle)) => GestureState::DraggingResize(handle),
        }
    }

    /// Adopt a new display geometry and restore the default box.
    ///
    /// Any gesture in progress is dropped.
    pub fn reset(&mut self, geometry: DisplayGeometry) {
        self.geometry = geometry;
        self.interaction = None;
        self.crop_box = CropBox::centered_default(&geometry, self.aspect_ratio);
    }

    /// Start a gesture explicitly, bypassing hit testing.
    pub fn begin(&mut self, kind: GestureKind, pointer: Point) {
        self.interaction = Some(Interaction {
            kind,
            start_pointer: pointer,
            start_box: self.crop_box,
        });
    }

    /// Hit-test `pointer` and start the matching gesture.
    pub fn pointer_down(&mut self, pointer: Point) -> Option<GestureKind> {
        let kind = match hit_test(&self.crop_box, pointer, HANDLE_RADIUS)? {
            HitTarget::Body => GestureKind::Move,
            HitTarget::Handle(handle) => GestureKind::Resize(handle),
        };
        self.begin(kind, pointer);
        Some(kind)
    }

    /// Recompute the box for the current pointer position.
    ///
    /// Returns `true` if the box changed.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        let Some(interaction) = self.interaction else {
            return false;
        };

        let dx = pointer.x - interaction.start_pointer.x;
        let dy = pointer.y - interaction.start_pointer.y;

        let next = match interaction.kind {
            GestureKind::Move => Some(move_box(&interaction.start_box, dx, dy, &self.geometry)),
            GestureKind::Resize(handle) => {
                let resized = resize_box(
                    &interaction.start_box,
                    handle,
                    dx,
                    dy,
                    &self.geometry,
                    self.aspect_ratio,
                    self.min_size,
                );
                if resized.is_none() {
                    tracing::debug!(%handle, dx, dy, "resize rejected");
                }
                resized
            }
        };

        match next {
            Some(next) if next != self.crop_box => {
                self.crop_box = next;
                true
            }
            _ => false,
        }
    }

    /// End the active gesture, keeping the box.
    pub fn pointer_up(&mut self) {
        self.interaction = None;
    }

    /// Feed a unified pointer event. Returns `true` if the box changed.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event.phase {
            PointerPhase::Down => {
                self.pointer_down(event.position);
                false
            }
            PointerPhase::Move => self.pointer_move(event.position),
            PointerPhase::Up => {
                self.pointer_up();
                false
            }
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
