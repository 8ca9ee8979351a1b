//! Background segmentation capability.
//!
//! The model itself is external; this module defines the capability seam and
//! an HTTP-backed implementation that talks to an inference endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::RgbaImage;
use std::time::Duration;

use crate::codec;

/// A background-removal capability: given an image, returns the same subject
/// with background pixels made transparent.
///
/// Implementations must be injectable (`Arc<dyn Segmenter>`) so the batch
/// processor can be exercised with stubs in tests.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, image: RgbaImage) -> Result<RgbaImage>;
}

/// Segmenter backed by an HTTP inference endpoint.
///
/// The request body is the PNG-encoded input; the response body is expected
/// to be a PNG with a synthesized alpha channel.
pub struct HttpSegmenter {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpSegmenter {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client for segmenter")?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

#[async_trait]
impl Segmenter for HttpSegmenter {
    async fn segment(&self, image: RgbaImage) -> Result<RgbaImage> {
        let png = codec::encode_png(&image)?;

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "image/png")
            .body(png)
            .send()
            .await
            .context("Segmenter request failed")?
            .error_for_status()
            .context("Segmenter returned an error status")?;

        let body = response
            .bytes()
            .await
            .context("Failed to read segmenter response body")?;

        codec::decode_rgba(&body).context("Segmenter response is not a decodable image")
    }
}
