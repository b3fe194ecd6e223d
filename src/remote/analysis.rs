//! `AnalysisClient` trait and the `POST /analyze` implementation.
//!
//! Wire shape:
//!
//! ```text
//! request:  {"image": "data:image/jpeg;base64,…", "name": "Asha"}
//! response: {"name", "gender", "attire", "message"?}  |  {"error": "…"}
//! ```
//!
//! The backend answers a structured error with HTTP 400, so the body is
//! parsed regardless of status.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::media::StillImage;

use super::endpoint;
use super::guest::GuestResult;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Errors from an analysis call.  Every variant is recoverable.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// HTTP transport or connection error.
    #[error("analysis request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("analysis request timed out")]
    Timeout,

    /// The response body matched neither the result nor the error shape.
    #[error("failed to parse analysis response: {0}")]
    Parse(String),

    /// The backend answered with `{"error": …}`.
    #[error("analysis backend error: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else {
            AnalysisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisClient trait
// ---------------------------------------------------------------------------

/// Classifies a guest photo.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, image: &StillImage, name: &str) -> Result<GuestResult, AnalysisError>;
}

// ---------------------------------------------------------------------------
// HttpAnalysisClient
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    image: String,
    name: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzeResponse {
    Failure { error: String },
    Success(GuestResult),
}

/// Calls `POST {base_url}/analyze`.
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    url: String,
}

impl HttpAnalysisClient {
    /// Build a client with the analysis timeout from `config`.
    ///
    /// A default (no-timeout) client is used if the builder fails.
    pub fn from_config(config: &BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.analysis_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(client, &config.base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "analyze"),
        }
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, image: &StillImage, name: &str) -> Result<GuestResult, AnalysisError> {
        let body = AnalyzeRequest {
            image: image.to_data_uri(),
            name,
        };

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        match parse_response(&text) {
            Err(AnalysisError::Parse(_)) if !status.is_success() => {
                Err(AnalysisError::Request(format!("HTTP {status}")))
            }
            other => other,
        }
    }
}

fn parse_response(body: &str) -> Result<GuestResult, AnalysisError> {
    match serde_json::from_str::<AnalyzeResponse>(body) {
        Ok(AnalyzeResponse::Success(result)) => Ok(result),
        Ok(AnalyzeResponse::Failure { error }) => Err(AnalysisError::Backend(error)),
        Err(e) => Err(AnalysisError::Parse(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// MockAnalysisClient  (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockAnalysisClient;

#[cfg(test)]
mod mock {
    use std::sync::Mutex;

    use tokio::sync::Notify;

    use super::*;

    /// Answers every call with a fixed outcome and records the names it
    /// was asked about.  A held client blocks until [`release`](Self::release).
    pub struct MockAnalysisClient {
        outcome: Result<GuestResult, String>,
        hold: bool,
        gate: Notify,
        calls: Mutex<Vec<String>>,
    }

    impl MockAnalysisClient {
        pub fn returning(result: GuestResult) -> Self {
            Self::with_outcome(Ok(result))
        }

        /// Every call fails with a structured backend error.
        pub fn failing(error: &str) -> Self {
            Self::with_outcome(Err(error.to_string()))
        }

        fn with_outcome(outcome: Result<GuestResult, String>) -> Self {
            Self {
                outcome,
                hold: false,
                gate: Notify::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn held(mut self) -> Self {
            self.hold = true;
            self
        }

        /// Let one held call complete.
        pub fn release(&self) {
            self.gate.notify_one();
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnalysisClient for MockAnalysisClient {
        async fn analyze(
            &self,
            _image: &StillImage,
            name: &str,
        ) -> Result<GuestResult, AnalysisError> {
            self.calls.lock().unwrap().push(name.to_string());
            if self.hold {
                self.gate.notified().await;
            }
            self.outcome.clone().map_err(AnalysisError::Backend)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::guest::{Attire, Gender};
    use crate::remote::test_server::{direct_client, serve_once};
    use image::{Rgba, RgbaImage};

    fn still() -> StillImage {
        StillImage::encode_jpeg(&RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])), 80)
            .expect("encode")
    }

    #[test]
    fn parse_success_payload() {
        let result =
            parse_response(r#"{"name":"Asha","gender":"female","attire":"suit"}"#).expect("ok");
        assert_eq!(result.gender, Gender::Female);
        assert_eq!(result.attire, Attire::Suit);
    }

    #[test]
    fn parse_error_payload() {
        let err = parse_response(r#"{"error":"no-face-detected"}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Backend(ref m) if m == "no-face-detected"));
    }

    #[test]
    fn parse_garbage_is_parse_error() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Err(AnalysisError::Parse(_))
        ));
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _client = HttpAnalysisClient::from_config(&BackendConfig::default());
    }

    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn AnalysisClient> =
            Box::new(HttpAnalysisClient::from_config(&BackendConfig::default()));
        drop(client);
    }

    #[tokio::test]
    async fn posts_image_and_name() {
        let (base, server) =
            serve_once(200, r#"{"name":"Asha","gender":"female","attire":"suit"}"#).await;
        let client = HttpAnalysisClient::with_client(direct_client(), &base);

        let result = client.analyze(&still(), "Asha").await.expect("analyze");
        assert_eq!(result.name, "Asha");

        let request = server.await.expect("server");
        assert!(request.starts_with("POST /analyze "));
        assert!(request.contains(r#""name":"Asha""#));
        assert!(request.contains("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn http_400_with_error_body_is_backend_error() {
        let (base, _server) = serve_once(400, r#"{"error":"No image provided"}"#).await;
        let client = HttpAnalysisClient::with_client(direct_client(), &base);

        let err = client.analyze(&still(), "Asha").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Backend(_)));
    }

    #[tokio::test]
    async fn http_500_without_json_is_request_error() {
        let (base, _server) = serve_once(500, "internal").await;
        let client = HttpAnalysisClient::with_client(direct_client(), &base);

        let err = client.analyze(&still(), "Asha").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Request(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_request_error() {
        // bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("port")
            .port();
        let client =
            HttpAnalysisClient::with_client(direct_client(), &format!("http://127.0.0.1:{port}"));

        let err = client.analyze(&still(), "Asha").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Request(_)));
    }
}
