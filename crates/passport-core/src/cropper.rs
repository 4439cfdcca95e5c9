//! The crop view: container fit, gesture editor and live preview together.
//!
//! A [`Cropper`] can exist before its photo is available. Until the photo is
//! loaded every render is a no-op; loading it fits the photo, creates the
//! default crop box and draws the first preview.

use crate::crop::{CropBox, CropEditor, GestureState, PointerEvent};
use crate::decode::DecodedImage;
use crate::geometry::{CoordinateMapper, DisplayGeometry, GeometryError, Size};
use crate::render::{render_crop, FinalImage, PhotoSpec, RenderError, RenderTarget};

#[derive(Debug, Clone)]
struct Loaded {
    source: DecodedImage,
    mapper: CoordinateMapper,
    editor: CropEditor,
}

#[derive(Debug, Clone)]
pub struct Cropper {
    spec: PhotoSpec,
    container: Size,
    loaded: Option<Loaded>,
    preview: Option<DecodedImage>,
}

impl Cropper {
    pub fn new(container: Size, spec: PhotoSpec) -> Self {
        Self {
            spec,
            container,
            loaded: None,
            preview: None,
        }
    }

    pub fn spec(&self) -> &PhotoSpec {
        &self.spec
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Attach the decoded photo and draw the first preview.
    pub fn load(&mut self, source: DecodedImage) -> Result<(), GeometryError> {
        let natural = Size::new(source.width as f64, source.height as f64);
        let mapper = CoordinateMapper::fit(natural, self.container)?;
        let editor = CropEditor::new(mapper.display(), self.spec.aspect_ratio());
        tracing::debug!(
            width = source.width,
            height = source.height,
            display = ?mapper.display(),
            "photo loaded into cropper"
        );
        self.loaded = Some(Loaded {
            source,
            mapper,
            editor,
        });
        self.refresh_preview();
        Ok(())
    }

    /// Refit the photo to a new container size and restore the default box.
    pub fn resize_container(&mut self, container: Size) -> Result<(), GeometryError> {
        if let Some(loaded) = &self.loaded {
            CoordinateMapper::fit(loaded.mapper.natural(), container)?;
        }
        self.container = container;
        self.reset();
        Ok(())
    }

    /// Recompute the fit and restore the default crop box.
    pub fn reset(&mut self) {
        let container = self.container;
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        match CoordinateMapper::fit(loaded.mapper.natural(), container) {
            Ok(mapper) => {
                loaded.mapper = mapper;
                loaded.editor.reset(mapper.display());
            }
            Err(err) => {
                tracing::warn!(%err, "cannot refit photo, keeping previous layout");
                loaded.editor.reset(loaded.mapper.display());
            }
        }
        self.refresh_preview();
    }

    /// Feed a pointer event; redraws the preview when the box changes.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let changed = loaded.editor.handle(event);
        if changed {
            self.refresh_preview();
        }
        changed
    }

    pub fn crop_box(&self) -> Option<CropBox> {
        self.loaded.as_ref().map(|l| l.editor.crop_box())
    }

    pub fn display_geometry(&self) -> Option<DisplayGeometry> {
        self.loaded.as_ref().map(|l| l.mapper.display())
    }

    pub fn gesture_state(&self) -> GestureState {
        self.loaded
            .as_ref()
            .map_or(GestureState::Idle, |l| l.editor.state())
    }

    /// The latest live preview, if a photo is loaded.
    pub fn preview(&self) -> Option<&DecodedImage> {
        self.preview.as_ref()
    }

    /// Render the current crop for `target`.
    ///
    /// Returns `Ok(None)` when no photo is loaded yet.
    pub fn render(&self, target: RenderTarget) -> Result<Option<DecodedImage>, RenderError> {
        let Some(loaded) = &self.loaded else {
            tracing::debug!(?target, "render skipped, photo not loaded");
            return Ok(None);
        };
        let (width, height) = target.dimensions(&self.spec);
        let raster = render_crop(
            &loaded.source,
            &loaded.mapper,
            &loaded.editor.crop_box(),
            width,
            height,
            target.filter(),
        )?;
        Ok(Some(raster))
    }

    /// Produce the print-resolution final image for the current crop.
    pub fn confirm(&self) -> Result<Option<FinalImage>, RenderError> {
        let Some(raster) = self.render(RenderTarget::Final)? else {
            return Ok(None);
        };
        let final_image = FinalImage::from_raster(&raster)?;
        tracing::info!(
            width = final_image.width(),
            height = final_image.height(),
            "crop confirmed"
        );
        Ok(Some(final_image))
    }

    fn refresh_preview(&mut self) {
        match self.render(RenderTarget::Preview) {
            Ok(preview) => self.preview = preview,
            Err(err) => tracing::warn!(%err, "preview render failed"),
        }
    }
}
