//! Uploaded image payload

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Upload rejection reasons
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Unsupported media type: {0} (expected image/png, image/jpeg or image/webp)")]
    UnsupportedMediaType(String),
}

/// Raster types accepted by the upload surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageMediaType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageMediaType {
    /// Parse a `Content-Type` value, ignoring parameters and case
    pub fn from_mime(value: &str) -> Result<Self, UploadError> {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::Webp),
            _ => Err(UploadError::UnsupportedMediaType(value.to_string())),
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}

/// Image supplied by the user
///
/// Bytes are reference-counted so state snapshots can share the payload.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub media_type: ImageMediaType,
    /// Original file name, if the browser sent one
    pub file_name: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl UploadedImage {
    /// Validate and wrap an uploaded payload
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: &str,
        file_name: Option<String>,
    ) -> Result<Self, UploadError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let media_type = ImageMediaType::from_mime(content_type)?;

        Ok(Self {
            bytes,
            media_type,
            file_name: file_name.filter(|n| !n.trim().is_empty()),
            received_at: Utc::now(),
        })
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
