//! Interactive crop selection.
//!
//! - [`types`]: the crop box, corner handles and passport constants
//! - [`pointer`]: device-independent pointer events and hit testing
//! - [`editor`]: the gesture state machine that moves and resizes the box
//!
//! # Gesture States
//!
//! ```text
//! Idle --down on body--> DraggingMove --up--> Idle
//! Idle --down on corner--> DraggingResize(handle) --up--> Idle
//! ```
//!
//! Moves clamp to the displayed image. Resizes that would shrink the box to
//! `MIN_CROP_SIZE` or push it outside the image are dropped for that frame.

mod editor;
mod pointer;
mod types;

pub use editor::{move_box, resize_box, CropEditor, GestureKind, GestureState, Interaction};
pub use pointer::{hit_test, HitTarget, PointerEvent, PointerPhase};
pub use types::{
    CropBox, Handle, DEFAULT_BOX_FRACTION, HANDLE_RADIUS, MIN_CROP_SIZE, PASSPORT_ASPECT_RATIO,
};
