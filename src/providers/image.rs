use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Produces an image for a prompt. `Ok(None)` is a soft failure the caller
/// is expected to tolerate.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, prompt: &str) -> Result<Option<Bytes>>;
}

#[derive(Debug, Serialize)]
pub struct ImageRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub image: Option<String>,
}

pub struct ImageFetcher {
    base_url: String,
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building image client")?;

        Ok(ImageFetcher {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Interprets a response from the image service.
    pub fn decode_response(status: StatusCode, body: &str) -> Result<Option<Bytes>> {
        if status != StatusCode::OK {
            warn!(%status, "image request failed");
            return Ok(None);
        }

        let data: ImageResponse =
            serde_json::from_str(body).context("parsing image response")?;

        if data.status != "success" {
            warn!(status = %data.status, "image service reported an error");
            return Ok(None);
        }

        let Some(encoded) = data.image else {
            warn!("image service reported success without an image");
            return Ok(None);
        };

        let decoded = STANDARD
            .decode(encoded.trim())
            .context("decoding base64 image")?;
        Ok(Some(Bytes::from(decoded)))
    }
}

#[async_trait]
impl ImageSource for ImageFetcher {
    async fn fetch_image(&self, prompt: &str) -> Result<Option<Bytes>> {
        let url = format!("{}/", self.base_url);
        debug!(%url, "requesting image");

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Self::decode_response(status, &body)
    }
}
