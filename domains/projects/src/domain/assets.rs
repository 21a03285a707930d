//! Asset types and validation for project uploads
//!
//! Assets are owned by their project and have no lifecycle of their own. The
//! project service stores asset payloads base64-encoded inside the project
//! representation; previews are decoded from that encoding on demand.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use promoreel_common::{Error, Result};

/// The role an uploaded file plays within a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Logo,
    Music,
}

impl AssetKind {
    /// Allowed content types per asset kind
    pub fn allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            Self::Image | Self::Logo => &["image/jpeg", "image/jpg", "image/png"],
            Self::Music => &["audio/mpeg", "audio/mp3", "audio/wav"],
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Logo => write!(f, "logo"),
            Self::Music => write!(f, "music"),
        }
    }
}

/// A file selected for upload, not yet accepted by the project service
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Maximum file size (10MB)
    pub const MAX_SIZE_BYTES: usize = 10 * 1024 * 1024;

    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Validate this file for the given asset kind
    pub fn validate(&self, kind: AssetKind) -> Result<()> {
        if self.filename.is_empty() {
            return Err(Error::Validation("Filename must not be empty".to_string()));
        }

        if !kind
            .allowed_content_types()
            .contains(&self.content_type.as_str())
        {
            return Err(Error::Validation(format!(
                "Content type '{}' not allowed for {} upload",
                self.content_type, kind
            )));
        }

        if self.bytes.is_empty() {
            return Err(Error::Validation(format!(
                "File '{}' is empty",
                self.filename
            )));
        }

        if self.bytes.len() > Self::MAX_SIZE_BYTES {
            return Err(Error::Validation(format!(
                "File '{}' exceeds maximum of {} bytes",
                self.filename,
                Self::MAX_SIZE_BYTES
            )));
        }

        Ok(())
    }

    /// Encode the payload the way the project service stores it
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Validate a batch of image uploads with atomic semantics: if any file fails,
/// the whole batch is rejected and nothing may be uploaded.
pub fn validate_image_batch(files: &[UploadFile]) -> Result<()> {
    if files.is_empty() {
        return Err(Error::Validation(
            "Image batch must contain at least one file".to_string(),
        ));
    }
    for file in files {
        file.validate(AssetKind::Image)?;
    }
    Ok(())
}

/// A decoded asset payload, ready to hand to a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewAsset {
    pub bytes: Vec<u8>,
}

impl PreviewAsset {
    /// Decode a single service-stored payload
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| Error::Validation(format!("Invalid base64 asset payload: {}", e)))?;
        Ok(Self { bytes })
    }
}

/// Decode every stored image payload into a renderable preview list
pub fn decode_previews(encoded: &[String]) -> Result<Vec<PreviewAsset>> {
    encoded.iter().map(|s| PreviewAsset::from_base64(s)).collect()
}
