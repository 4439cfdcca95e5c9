//! Workflow session bindings.
//!
//! JavaScript owns the DOM, the file picker and the network. It forwards
//! user actions to a [`PassportSession`] and reads state back after each
//! call. Background edits use a ticket round trip:
//!
//! ```typescript
//! const req = session.request_background("blue");
//! if (req) {
//!   try {
//!     const image = await callImageService(req.imageBase64, req.mimeType, req.prompt);
//!     session.complete_background(req.ticket, image);
//!   } catch (e) {
//!     session.fail_background(req.ticket, String(e));
//!   }
//! }
//! ```

use passport_core::background::{decode_image_data, BackgroundError, BackgroundOption};
use passport_core::compose::PageLayoutConfig;
use passport_core::crop::PointerEvent;
use passport_core::export::ExportFormat;
use passport_core::geometry::Size;
use passport_core::session::{Effect, EditTicket, Session, SessionConfig, SessionEvent, Stage};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::{to_js_error, JsDecodedImage};

/// What JavaScript needs to call the image service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackgroundPayload {
    pub ticket: u32,
    pub image_base64: String,
    pub mime_type: String,
    pub prompt: String,
}

#[wasm_bindgen]
pub struct PassportSession {
    inner: Session,
}

#[wasm_bindgen]
impl PassportSession {
    /// Create a session. `config` may be `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PassportSession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid session config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// `"selecting"`, `"cropping"` or `"editing"`.
    #[wasm_bindgen(getter)]
    pub fn stage(&self) -> String {
        match self.inner.stage() {
            Stage::Selecting => "selecting",
            Stage::Cropping => "cropping",
            Stage::Editing => "editing",
        }
        .to_string()
    }

    /// The banner message, if any.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.inner.error().map(|e| e.to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    #[wasm_bindgen(getter)]
    pub fn loading_message(&self) -> Option<String> {
        self.inner.loading_message()
    }

    /// Load the selected file. Returns `true` when cropping starts.
    pub fn select_image(&mut self, bytes: &[u8]) -> bool {
        self.apply(SessionEvent::ImageSelected {
            bytes: bytes.to_vec(),
        });
        self.inner.stage() == Stage::Cropping
    }

    pub fn resize_container(&mut self, width: f64, height: f64) {
        self.apply(SessionEvent::ContainerResized(Size::new(width, height)));
    }

    /// Mouse or touch start. Returns `true` if the crop box changed.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.pointer(PointerEvent::down(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.pointer(PointerEvent::moved(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.pointer(PointerEvent::up(x, y))
    }

    pub fn reset_crop(&mut self) {
        self.apply(SessionEvent::ResetCrop);
    }

    pub fn confirm_crop(&mut self) {
        self.apply(SessionEvent::ConfirmCrop);
    }

    pub fn cancel_crop(&mut self) {
        self.apply(SessionEvent::CancelCrop);
    }

    pub fn recrop(&mut self) {
        self.apply(SessionEvent::Recrop);
    }

    pub fn start_over(&mut self) {
        self.apply(SessionEvent::StartOver);
    }

    pub fn dismiss_error(&mut self) {
        self.apply(SessionEvent::DismissError);
    }

    /// `{x, y, width, height}` of the crop box, or `undefined`.
    pub fn crop_box(&self) -> Result<JsValue, JsValue> {
        let crop_box = self.inner.cropper().and_then(|c| c.crop_box());
        serde_wasm_bindgen::to_value(&crop_box).map_err(to_js_error)
    }

    /// `{left, top, width, height}` of the displayed photo, or `undefined`.
    pub fn display_geometry(&self) -> Result<JsValue, JsValue> {
        let geometry = self.inner.cropper().and_then(|c| c.display_geometry());
        serde_wasm_bindgen::to_value(&geometry).map_err(to_js_error)
    }

    /// The live crop preview.
    pub fn preview(&self) -> Option<JsDecodedImage> {
        self.inner
            .cropper()
            .and_then(|c| c.preview())
            .cloned()
            .map(JsDecodedImage::from_decoded)
    }

    /// PNG bytes of the photo that gets printed.
    pub fn final_png(&self) -> Option<Vec<u8>> {
        self.inner.final_image().map(|img| img.png().to_vec())
    }

    /// Start a background edit: `"white"` or `"blue"`.
    ///
    /// Returns `{ticket, imageBase64, mimeType, prompt}`, or `undefined` when an
    /// edit is already running or no photo is being edited.
    pub fn request_background(&mut self, option: &str) -> Result<JsValue, JsValue> {
        let option = parse_option(option).ok_or_else(|| {
            JsValue::from_str(&format!("Unknown background option '{}'", option))
        })?;
        let payload = self.request(option);
        serde_wasm_bindgen::to_value(&payload).map_err(to_js_error)
    }

    /// Deliver the base64 image returned by the service.
    pub fn complete_background(&mut self, ticket: u32, image_base64: &str) {
        let result = decode_image_data(image_base64);
        self.apply(SessionEvent::BackgroundCompleted {
            ticket: EditTicket(ticket),
            result,
        });
    }

    /// Report that the service call failed.
    pub fn fail_background(&mut self, ticket: u32, message: &str) {
        self.apply(SessionEvent::BackgroundCompleted {
            ticket: EditTicket(ticket),
            result: Err(BackgroundError::Request(message.to_string())),
        });
    }

    pub fn set_layout(&mut self, width_cm: f64, height_cm: f64, copies: u32) {
        self.apply(SessionEvent::SetLayout(PageLayoutConfig {
            width_cm,
            height_cm,
            copies,
        }));
    }

    /// The current `{width_cm, height_cm, copies}` layout.
    pub fn layout(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.layout()).map_err(to_js_error)
    }

    /// The A4 print page for the current photo and layout.
    pub fn compose_page(&self) -> Result<Option<JsDecodedImage>, JsValue> {
        self.inner
            .compose_page()
            .map(|page| page.map(JsDecodedImage::from_decoded))
            .map_err(to_js_error)
    }

    /// Encoded download bytes: `"png"`, `"jpeg"` or `"pdf"`.
    pub fn export(&self, format: &str) -> Result<Option<Vec<u8>>, JsValue> {
        let format: ExportFormat = format.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner
            .export(format)
            .map(|file| file.map(|f| f.bytes))
            .map_err(to_js_error)
    }
}

impl PassportSession {
    pub(crate) fn with_config(config: SessionConfig) -> Self {
        Self {
            inner: Session::new(config),
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &Session {
        &self.inner
    }

    fn apply(&mut self, event: SessionEvent) -> Option<Effect> {
        let before = self.inner.error();
        let session = std::mem::take(&mut self.inner);
        let (next, effect) = session.reduce(event);
        self.inner = next;

        if let Some(err) = self.inner.error() {
            if before != Some(err) {
                console_warn(&err.to_string());
            }
        }
        effect
    }

    fn pointer(&mut self, event: PointerEvent) -> bool {
        let before = self.inner.cropper().and_then(|c| c.crop_box());
        self.apply(SessionEvent::Pointer(event));
        self.inner.cropper().and_then(|c| c.crop_box()) != before
    }

    pub(crate) fn request(&mut self, option: BackgroundOption) -> Option<BackgroundPayload> {
        match self.apply(SessionEvent::RequestBackground(option))? {
            Effect::EditBackground { ticket, request } => Some(BackgroundPayload {
                ticket: ticket.0,
                image_base64: request.encoded_image(),
                mime_type: request.mime_type,
                prompt: request.prompt,
            }),
        }
    }
}

fn parse_option(option: &str) -> Option<BackgroundOption> {
    BackgroundOption::ALL
        .into_iter()
        .find(|candidate| candidate.key() == option)
}

#[cfg(target_arch = "wasm32")]
fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn console_warn(_message: &str) {}


/// WASM-only tests for the `JsValue` surface. Run with `wasm-pack test`.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use passport_core::decode::DecodedImage;
    use passport_core::encode::encode_png;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn editing() -> PassportSession {
        let img = DecodedImage::filled(300, 400, [120, 110, 100]);
        let bytes = encode_png(&img.pixels, img.width, img.height).unwrap();
        let mut session = PassportSession::new(JsValue::UNDEFINED).unwrap();
        session.select_image(&bytes);
        session.confirm_crop();
        session
    }

    #[wasm_bindgen_test]
    fn test_crop_box_is_undefined_before_load() {
        let session = PassportSession::new(JsValue::NULL).unwrap();
        assert!(session.crop_box().unwrap().is_undefined());
        assert!(session.display_geometry().unwrap().is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_invalid_config_is_rejected() {
        assert!(PassportSession::new(JsValue::from_f64(42.0)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_request_background_payload() {
        let mut session = editing();
        let payload = session.request_background("white").unwrap();
        assert!(payload.is_object());
        assert!(session.request_background("white").unwrap().is_undefined());
        assert!(session.request_background("purple").is_err());
    }

    #[wasm_bindgen_test]
    fn test_export_formats() {
        let session = editing();
        let pdf = session.export("pdf").unwrap().unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert!(session.export("gif").is_err());
    }
}
