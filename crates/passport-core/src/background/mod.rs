//! Background replacement through an external image-generation service.
//!
//! The session never talks to a service directly. It builds a
//! [`BackgroundEditRequest`] and hands it to whatever [`BackgroundEditor`]
//! the host injected: the bundled [`GeminiClient`] on native targets, a
//! JavaScript bridge in the browser, or a fake in tests.

#[cfg(feature = "gemini")]
mod gemini;

use std::future::Future;
use std::pin::Pin;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::FinalImage;

#[cfg(feature = "gemini")]
pub use gemini::{extract_image, GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Errors from a background edit.
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("No API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    #[error("No image data found in the response")]
    NoImageData,

    #[error("Image data is not valid base64: {0}")]
    InvalidImageData(#[from] base64::DecodeError),
}

/// The two backgrounds the editor offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundOption {
    #[serde(rename = "white")]
    White,
    #[serde(rename = "blue")]
    LightBlue,
}

impl BackgroundOption {
    pub const ALL: [BackgroundOption; 2] = [BackgroundOption::White, BackgroundOption::LightBlue];

    /// Instruction sent with the photo.
    pub fn prompt(self) -> &'static str {
        match self {
            BackgroundOption::White => {
                "Change the background to a solid, plain, uniform off-white color suitable for a passport photo."
            }
            BackgroundOption::LightBlue => {
                "Change the background to a solid, plain, uniform light blue color suitable for a passport photo."
            }
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            BackgroundOption::White => "white",
            BackgroundOption::LightBlue => "blue",
        }
    }

    /// Status line shown while the edit is running.
    pub fn loading_message(self) -> String {
        format!("Applying {} background...", self.key())
    }
}

/// Everything a service needs to edit one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundEditRequest {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub prompt: String,
}

impl BackgroundEditRequest {
    /// Request an edit of the cropped photo.
    pub fn for_photo(photo: &FinalImage, option: BackgroundOption) -> Self {
        Self {
            image_bytes: photo.png().to_vec(),
            mime_type: FinalImage::MIME_TYPE.to_string(),
            prompt: option.prompt().to_string(),
        }
    }

    /// Image bytes in standard base64, as sent inline to the service.
    pub fn encoded_image(&self) -> String {
        BASE64.encode(&self.image_bytes)
    }
}

/// Decode base64 image data returned by a service.
pub fn decode_image_data(data: &str) -> Result<Vec<u8>, BackgroundError> {
    Ok(BASE64.decode(data.trim())?)
}

pub type EditFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, BackgroundError>> + 'a>>;

/// A service that replaces the background of a photo.
///
/// Resolves to the encoded bytes of the edited image.
pub trait BackgroundEditor {
    fn edit<'a>(&'a self, request: &'a BackgroundEditRequest) -> EditFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;

    #[test]
    fn test_prompts_name_the_color() {
        assert!(BackgroundOption::White.prompt().contains("off-white"));
        assert!(BackgroundOption::LightBlue.prompt().contains("light blue"));
        for option in BackgroundOption::ALL {
            assert!(option.prompt().ends_with("suitable for a passport photo."));
        }
    }

    #[test]
    fn test_loading_message() {
        assert_eq!(
            BackgroundOption::LightBlue.loading_message(),
            "Applying blue background..."
        );
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_option_serde_keys() {
        assert_eq!(
            serde_json::to_string(&BackgroundOption::White).unwrap(),
            "\"white\""
        );
        let parsed: BackgroundOption = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(parsed, BackgroundOption::LightBlue);
        assert_eq!(parsed.key(), "blue");
    }

    #[test]
    fn test_request_from_photo() {
        let raster = DecodedImage::filled(4, 5, [10, 20, 30]);
        let photo = FinalImage::from_raster(&raster).unwrap();
        let request = BackgroundEditRequest::for_photo(&photo, BackgroundOption::White);

        assert_eq!(request.mime_type, "image/png");
        assert_eq!(request.image_bytes, photo.png());
        assert_eq!(decode_image_data(&request.encoded_image()).unwrap(), photo.png());
    }

    #[test]
    fn test_decode_image_data_rejects_garbage() {
        assert!(matches!(
            decode_image_data("not base64!"),
            Err(BackgroundError::InvalidImageData(_))
        ));
    }
}
