//! `GestureDetector` trait and the wave-detection HTTP client.
//!
//! ```text
//! POST /detect_wave  {"image": "data:…"}  →  {"wave": bool}
//! POST /wave_reset   (no body)            →  ignored
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::media::StillImage;

use super::endpoint;

/// Errors from a gesture call.  Callers treat all of them as "no wave".
#[derive(Debug, Error)]
pub enum GestureError {
    #[error("gesture request failed: {0}")]
    Request(String),

    #[error("gesture request timed out")]
    Timeout,

    #[error("failed to parse gesture response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GestureError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GestureError::Timeout
        } else if e.is_decode() {
            GestureError::Parse(e.to_string())
        } else {
            GestureError::Request(e.to_string())
        }
    }
}

/// Remote motion detector with server-held motion history.
#[async_trait]
pub trait GestureDetector: Send + Sync {
    /// `true` when the frame completes a wave.
    async fn detect(&self, image: &StillImage) -> Result<bool, GestureError>;

    /// Clear the server-held motion history.
    async fn reset(&self) -> Result<(), GestureError>;
}

#[derive(Serialize)]
struct DetectRequest {
    image: String,
}

#[derive(Deserialize)]
struct DetectResponse {
    wave: bool,
}

/// Calls `/detect_wave` and `/wave_reset` under `base_url`.
pub struct HttpGestureClient {
    client: reqwest::Client,
    detect_url: String,
    reset_url: String,
}

impl HttpGestureClient {
    /// Build a client with the (short) gesture timeout from `config`.
    pub fn from_config(config: &BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.gesture_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, &config.base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            detect_url: endpoint(base_url, "detect_wave"),
            reset_url: endpoint(base_url, "wave_reset"),
        }
    }
}

#[async_trait]
impl GestureDetector for HttpGestureClient {
    async fn detect(&self, image: &StillImage) -> Result<bool, GestureError> {
        let body = DetectRequest {
            image: image.to_data_uri(),
        };
        let response = self
            .client
            .post(&self.detect_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: DetectResponse = response.json().await?;
        Ok(parsed.wave)
    }

    async fn reset(&self) -> Result<(), GestureError> {
        self.client
            .post(&self.reset_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
pub use mock::MockGestureDetector;
