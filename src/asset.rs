//! Asset Encoder — uploaded binaries as self-describing inline assets.
//!
//! Every file that reaches a renderer goes through here first: the staged
//! bytes are read once and carried as (media type, base64 payload), so no
//! renderer ever touches the staging directory. Memory use scales with total
//! uploaded bytes per request; acceptable for reports of tens of images.

use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// An uploaded file parked in the per-request staging directory,
/// waiting to be encoded. Media type comes verbatim from the upload.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub media_type: String,
    pub path: PathBuf,
}

/// A binary file as (media type, reversible base64 encoding of its bytes).
/// Embeddable by any renderer without further disk access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedAsset {
    pub media_type: String,
    pub data: String,
}

impl EncodedAsset {
    /// Encode raw bytes under the given media type.
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Read a staged upload into an encoded asset.
    ///
    /// The only failure mode is the underlying byte read; the encoding
    /// itself cannot fail.
    pub async fn read(staged: &StagedUpload) -> Result<Self, RenderError> {
        let bytes = tokio::fs::read(&staged.path).await?;
        Ok(Self::from_bytes(staged.media_type.clone(), &bytes))
    }

    /// Decode the payload back to the original bytes.
    /// A corrupt payload is an asset fault, whichever renderer hits it.
    pub fn decode(&self) -> Result<Vec<u8>, RenderError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| {
                RenderError::AssetRead(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("asset payload corrupt: {e}"),
                ))
            })
    }

    /// `data:` URL form for inline embedding in print markup.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// True when the media type names a JPEG subtype.
    pub fn is_jpeg(&self) -> bool {
        self.media_type.contains("jpeg")
    }

    /// File extension the spreadsheet backend files the image under.
    /// Everything that is not JPEG is treated as PNG.
    pub fn extension(&self) -> &'static str {
        if self.is_jpeg() {
            "jpg"
        } else {
            "png"
        }
    }
}
