//! Resolving depth map references into image bytes.
//!
//! The service answers with a reference rather than pixels: either a
//! `data:` URI carrying the encoded image inline, or an `http(s)` URL to
//! fetch it from. The bytes are handed back untouched.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tracing::debug;
use url::Url;

/// Where a depth map reference points.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthMapSource {
    /// Inline image data.
    Inline { mime_type: String, bytes: Bytes },
    /// Image hosted by the service.
    Remote(Url),
}

impl DepthMapSource {
    /// Classifies a reference string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DepthMap`] for malformed data URIs, non-base64
    /// data URIs and URLs with schemes other than http or https.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();

        if let Some(rest) = reference.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| AppError::depth_map("data URI has no payload"))?;
            let mime_type = meta
                .strip_suffix(";base64")
                .ok_or_else(|| AppError::depth_map("only base64 data URIs are supported"))?;
            let bytes = BASE64
                .decode(payload.trim())
                .map_err(|e| AppError::depth_map(format!("invalid base64 payload: {}", e)))?;

            return Ok(Self::Inline {
                mime_type: mime_type.to_string(),
                bytes: Bytes::from(bytes),
            });
        }

        let url = Url::parse(reference)
            .map_err(|e| AppError::depth_map(format!("'{}' is not a URL: {}", reference, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            other => Err(AppError::depth_map(format!("unsupported scheme '{}'", other))),
        }
    }
}

/// Produces the encoded image bytes behind a depth map reference.
///
/// Remote references are fetched with `http`; inline ones are decoded.
pub async fn resolve(reference: &str, http: &reqwest::Client) -> Result<Bytes> {
    match DepthMapSource::parse(reference)? {
        DepthMapSource::Inline { bytes, .. } => Ok(bytes),
        DepthMapSource::Remote(url) => {
            debug!(%url, "fetching depth map");
            let response = http
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| AppError::depth_map(format!("download failed: {}", e)))?;

            response
                .bytes()
                .await
                .map_err(|e| AppError::depth_map(format!("download failed: {}", e)))
        }
    }
}
