//! Downloads and decodes dog pictures
//!
//! The download runs on whatever runtime polls the future; decoding is
//! CPU-bound and goes to a blocking worker.

use image::RgbaImage;
use std::sync::Arc;
use tracing::debug;

use crate::error::FetchError;

/// Fetch `url` and decode it into RGBA pixels
pub async fn load_image(client: reqwest::Client, url: String) -> Result<Arc<RgbaImage>, FetchError> {
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let bytes = response.bytes().await?;
    debug!(%url, size = bytes.len(), "image downloaded");

    // Spawn blocking task for CPU-bound work
    let pixels = tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| FetchError::Worker(e.to_string()))??;

    Ok(Arc::new(pixels))
}

/// Decode any format the `image` crate knows into RGBA8
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, FetchError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(decoded.into_rgba8())
}
