//! Passport Core - crop, render and print-layout library
//!
//! This crate provides the image side of the passport photo maker: decoding
//! the selected photo, the aspect-locked interactive crop, the preview and
//! print-resolution renders, optional background replacement, A4 page
//! composition and PNG/JPEG/PDF export.
//!
//! [`session::Session`] ties the pieces into the select → crop → edit
//! workflow; every other module is usable on its own.

pub mod background;
pub mod compose;
pub mod crop;
pub mod cropper;
pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod render;
pub mod session;
pub mod units;

pub use background::{BackgroundEditRequest, BackgroundEditor, BackgroundError, BackgroundOption};
pub use compose::{compose_page, layout_positions, ComposeError, PageLayoutConfig, PageSpec};
pub use crop::{CropBox, CropEditor, GestureState, Handle, PointerEvent, PointerPhase};
pub use cropper::Cropper;
pub use decode::{decode_image, DecodeError, DecodedImage, FilterType};
pub use encode::EncodeError;
pub use export::{export_page, ExportError, ExportFormat, ExportedFile};
pub use geometry::{CoordinateMapper, DisplayGeometry, GeometryError, Point, Size, SourceRect};
pub use render::{render_crop, FinalImage, PhotoSpec, RenderError, RenderTarget};
pub use session::{Effect, EditTicket, Session, SessionConfig, SessionError, SessionEvent, Stage};
pub use units::{cm_to_px, PRINT_DPI};
