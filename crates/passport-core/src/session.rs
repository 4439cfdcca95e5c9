//! The select → crop → edit workflow.
//!
//! [`Session`] is a single owned state value. Every user action or async
//! completion is a [`SessionEvent`]; [`Session::reduce`] consumes the session
//! and returns the next one, plus at most one [`Effect`] the host must run.
//! The only effect is a background edit, performed against an injected
//! [`BackgroundEditor`] and fed back as `BackgroundCompleted`.
//!
//! Background edits carry an [`EditTicket`]. A completion is applied only if
//! its ticket is the pending one and the session is still editing, so a
//! result that arrives after start-over or re-crop is dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::background::{BackgroundEditRequest, BackgroundEditor, BackgroundError, BackgroundOption};
use crate::compose::{self, PageLayoutConfig, PageSpec};
use crate::crop::PointerEvent;
use crate::cropper::Cropper;
use crate::decode::{self, DecodedImage};
use crate::export::{self, ExportError, ExportFormat, ExportedFile};
use crate::geometry::Size;
use crate::render::{FinalImage, PhotoSpec};

/// User-facing banner errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Failed to read the image file. Please try another one.")]
    UnreadableImage,

    #[error("Failed to crop the image. Please try again.")]
    CropFailed,

    #[error("Failed to edit background. Please try again.")]
    BackgroundFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Selecting,
    Cropping,
    Editing,
}

/// Identifies one background edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditTicket(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Initial crop container size, in layout pixels.
    pub container: Size,
    pub photo: PhotoSpec,
    pub page: PageSpec,
    pub layout: PageLayoutConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            container: Size::new(800.0, 450.0),
            photo: PhotoSpec::default(),
            page: PageSpec::default(),
            layout: PageLayoutConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    ImageSelected { bytes: Vec<u8> },
    ContainerResized(Size),
    Pointer(PointerEvent),
    ResetCrop,
    ConfirmCrop,
    CancelCrop,
    Recrop,
    StartOver,
    RequestBackground(BackgroundOption),
    BackgroundCompleted {
        ticket: EditTicket,
        result: Result<Vec<u8>, BackgroundError>,
    },
    SetLayout(PageLayoutConfig),
    DismissError,
}

/// Work the host must perform on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    EditBackground {
        ticket: EditTicket,
        request: BackgroundEditRequest,
    },
}

impl Effect {
    /// Run the effect and return the event that reports its outcome.
    pub async fn perform<E>(self, editor: &E) -> SessionEvent
    where
        E: BackgroundEditor + ?Sized,
    {
        match self {
            Effect::EditBackground { ticket, request } => {
                let result = editor.edit(&request).await;
                SessionEvent::BackgroundCompleted { ticket, result }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingEdit {
    ticket: EditTicket,
    option: BackgroundOption,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    stage: Stage,
    cropper: Option<Cropper>,
    cropped: Option<FinalImage>,
    final_image: Option<FinalImage>,
    pending: Option<PendingEdit>,
    next_ticket: u32,
    error: Option<SessionError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            stage: Stage::Selecting,
            cropper: None,
            cropped: None,
            final_image: None,
            pending: None,
            next_ticket: 0,
            error: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn layout(&self) -> &PageLayoutConfig {
        &self.config.layout
    }

    pub fn cropper(&self) -> Option<&Cropper> {
        self.cropper.as_ref()
    }

    /// The last confirmed crop, before any background edit.
    pub fn cropped_image(&self) -> Option<&FinalImage> {
        self.cropped.as_ref()
    }

    /// The photo that gets printed.
    pub fn final_image(&self) -> Option<&FinalImage> {
        self.final_image.as_ref()
    }

    pub fn error(&self) -> Option<SessionError> {
        self.error
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn loading_message(&self) -> Option<String> {
        self.pending.map(|p| p.option.loading_message())
    }

    pub fn pending_ticket(&self) -> Option<EditTicket> {
        self.pending.map(|p| p.ticket)
    }

    /// Apply one event.
    pub fn reduce(mut self, event: SessionEvent) -> (Session, Option<Effect>) {
        let mut effect = None;
        match event {
            SessionEvent::ImageSelected { bytes } => self.select_image(&bytes),
            SessionEvent::ContainerResized(size) => self.resize_container(size),
            SessionEvent::Pointer(pointer) => {
                if self.stage == Stage::Cropping {
                    if let Some(cropper) = self.cropper.as_mut() {
                        cropper.handle_pointer(pointer);
                    }
                }
            }
            SessionEvent::ResetCrop => {
                if self.stage == Stage::Cropping {
                    if let Some(cropper) = self.cropper.as_mut() {
                        cropper.reset();
                    }
                }
            }
            SessionEvent::ConfirmCrop => self.confirm_crop(),
            SessionEvent::CancelCrop | SessionEvent::StartOver => self.start_over(),
            SessionEvent::Recrop => self.recrop(),
            SessionEvent::RequestBackground(option) => effect = self.request_background(option),
            SessionEvent::BackgroundCompleted { ticket, result } => {
                self.complete_background(ticket, result)
            }
            SessionEvent::SetLayout(layout) => self.config.layout = layout,
            SessionEvent::DismissError => self.error = None,
        }
        (self, effect)
    }

    /// Compose the print page from the current photo and layout.
    ///
    /// Returns `Ok(None)` outside the editing stage.
    pub fn compose_page(&self) -> Result<Option<DecodedImage>, ExportError> {
        let Some(photo) = self.printable() else {
            return Ok(None);
        };
        let raster = photo.decode().map_err(compose::ComposeError::from)?;
        let page = compose::compose_page(&raster, &self.config.layout, &self.config.page)?;
        Ok(Some(page))
    }

    /// Compose and encode the print page for download.
    pub fn export(&self, format: ExportFormat) -> Result<Option<ExportedFile>, ExportError> {
        let Some(page) = self.compose_page()? else {
            return Ok(None);
        };
        Ok(Some(export::export_page(&page, format, &self.config.page)?))
    }

    fn printable(&self) -> Option<&FinalImage> {
        if self.stage == Stage::Editing {
            self.final_image.as_ref()
        } else {
            None
        }
    }

    fn select_image(&mut self, bytes: &[u8]) {
        if self.stage != Stage::Selecting {
            tracing::debug!(stage = ?self.stage, "image selection ignored");
            return;
        }
        self.error = None;

        let source = match decode::decode_image(bytes) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(%err, "selected file could not be decoded");
                self.error = Some(SessionError::UnreadableImage);
                return;
            }
        };

        let mut cropper = Cropper::new(self.config.container, self.config.photo);
        if let Err(err) = cropper.load(source) {
            tracing::warn!(%err, "selected image could not be fitted");
            self.error = Some(SessionError::UnreadableImage);
            return;
        }

        self.cropper = Some(cropper);
        self.stage = Stage::Cropping;
    }

    fn resize_container(&mut self, size: Size) {
        if let Some(cropper) = self.cropper.as_mut() {
            if let Err(err) = cropper.resize_container(size) {
                tracing::warn!(%err, "container resize ignored");
                return;
            }
        }
        self.config.container = size;
    }

    fn confirm_crop(&mut self) {
        if self.stage != Stage::Cropping {
            return;
        }
        let Some(cropper) = self.cropper.as_ref() else {
            return;
        };
        match cropper.confirm() {
            Ok(Some(photo)) => {
                self.cropped = Some(photo.clone());
                self.final_image = Some(photo);
                self.stage = Stage::Editing;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%err, "crop render failed");
                self.error = Some(SessionError::CropFailed);
            }
        }
    }

    fn start_over(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(ticket = pending.ticket.0, "abandoning background edit");
        }
        self.cropper = None;
        self.cropped = None;
        self.final_image = None;
        self.error = None;
        self.stage = Stage::Selecting;
    }

    fn recrop(&mut self) {
        if self.stage != Stage::Editing {
            return;
        }
        if let Some(pending) = self.pending.take() {
            tracing::debug!(ticket = pending.ticket.0, "abandoning background edit");
        }
        self.final_image = self.cropped.clone();
        if let Some(cropper) = self.cropper.as_mut() {
            cropper.reset();
        }
        self.stage = Stage::Cropping;
    }

    fn request_background(&mut self, option: BackgroundOption) -> Option<Effect> {
        if self.stage != Stage::Editing || self.pending.is_some() {
            return None;
        }
        let cropped = self.cropped.as_ref()?;

        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = EditTicket(self.next_ticket);
        let request = BackgroundEditRequest::for_photo(cropped, option);

        self.error = None;
        self.pending = Some(PendingEdit { ticket, option });
        tracing::info!(ticket = ticket.0, option = option.key(), "background edit requested");
        Some(Effect::EditBackground { ticket, request })
    }

    fn complete_background(&mut self, ticket: EditTicket, result: Result<Vec<u8>, BackgroundError>) {
        let current = self.pending.filter(|p| p.ticket == ticket);
        if current.is_none() || self.stage != Stage::Editing {
            tracing::warn!(ticket = ticket.0, "discarding stale background result");
            return;
        }
        self.pending = None;

        match result.map_err(ApplyError::from).and_then(|bytes| reencode(&bytes)) {
            Ok(photo) => {
                tracing::info!(
                    ticket = ticket.0,
                    width = photo.width(),
                    height = photo.height(),
                    "background edit applied"
                );
                self.final_image = Some(photo);
            }
            Err(err) => {
                tracing::warn!(ticket = ticket.0, %err, "background edit failed");
                self.error = Some(SessionError::BackgroundFailed);
            }
        }
    }
}

#[derive(Debug, Error)]
enum ApplyError {
    #[error(transparent)]
    Service(#[from] BackgroundError),

    #[error("result is not an image: {0}")]
    Decode(#[from] decode::DecodeError),

    #[error("result could not be re-encoded: {0}")]
    Encode(#[from] crate::encode::EncodeError),
}

/// Normalise a service result into a PNG final image.
fn reencode(bytes: &[u8]) -> Result<FinalImage, ApplyError> {
    let raster = decode::decode_image(bytes)?;
    Ok(FinalImage::from_raster(&raster)?)
}
