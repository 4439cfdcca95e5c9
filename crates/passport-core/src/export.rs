//! Download formats for the composed print page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::{ComposeError, PageSpec};
use crate::decode::DecodedImage;
use crate::encode::{self, EncodeError, DEFAULT_JPEG_QUALITY};

/// Base name of every exported file.
pub const EXPORT_BASE_NAME: &str = "passport_photos";

/// Errors from producing a download.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Page composition failed: {0}")]
    Compose(#[from] ComposeError),

    #[error("Export encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Png, ExportFormat::Jpeg];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// `passport_photos.<ext>`
    pub fn file_name(self) -> String {
        format!("{EXPORT_BASE_NAME}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

/// An encoded page ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub fn file_name(&self) -> String {
        self.format.file_name()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Encode a composed page in `format`.
pub fn export_page(
    page: &DecodedImage,
    format: ExportFormat,
    page_spec: &PageSpec,
) -> Result<ExportedFile, EncodeError> {
    let bytes = match format {
        ExportFormat::Png => encode::encode_png(&page.pixels, page.width, page.height)?,
        ExportFormat::Jpeg => {
            encode::encode_jpeg(&page.pixels, page.width, page.height, DEFAULT_JPEG_QUALITY)?
        }
        ExportFormat::Pdf => encode_pdf(page, page_spec)?,
    };
    tracing::info!(%format, bytes = bytes.len(), "page exported");
    Ok(ExportedFile { format, bytes })
}

#[cfg(feature = "pdf")]
fn encode_pdf(page: &DecodedImage, page_spec: &PageSpec) -> Result<Vec<u8>, EncodeError> {
    encode::encode_pdf_page(&page.pixels, page.width, page.height, page_spec)
}

#[cfg(not(feature = "pdf"))]
fn encode_pdf(_page: &DecodedImage, _page_spec: &PageSpec) -> Result<Vec<u8>, EncodeError> {
    Err(EncodeError::EncodingFailed {
        format: "PDF",
        message: "PDF support is not enabled".to_string(),
    })
}
