use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Re-encodes uploaded image files as inline `data:` URIs, one file at a
/// time.
#[derive(Clone)]
pub struct MediaService {
    max_image_bytes: usize,
}

impl MediaService {
    pub fn new(max_image_bytes: usize) -> Self {
        Self { max_image_bytes }
    }

    pub async fn encode_data_uri(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.encode_bytes(&bytes, &name)
    }

    /// Sequential loop over the files; the first failure aborts the batch.
    pub async fn encode_all(&self, paths: &[PathBuf]) -> Result<Vec<String>> {
        let mut uris = Vec::with_capacity(paths.len());
        for path in paths {
            uris.push(self.encode_data_uri(path).await?);
        }
        Ok(uris)
    }

    pub fn encode_bytes(&self, bytes: &[u8], filename: &str) -> Result<String> {
        if bytes.len() > self.max_image_bytes {
            return Err(anyhow!(
                "image too large: {} bytes (limit {})",
                bytes.len(),
                self.max_image_bytes
            ));
        }
        let mime = sniff_mime(bytes, filename)
            .ok_or_else(|| anyhow!("unsupported image type: {}", filename))?;
        tracing::info!(filename, mime, size = bytes.len(), "image encoded");
        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }
}

/// Magic bytes first, file extension as fallback.
fn sniff_mime(bytes: &[u8], filename: &str) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if bytes.starts_with(b"GIF8") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    let extension = filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        Some("svg") => Some("image/svg+xml"),
        _ => None,
    }
}
