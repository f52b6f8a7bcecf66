//! Client for the external landmark detector.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use serde::Deserialize;

use crate::config::{DetectorConfig, DetectorMode};
use crate::pose::landmarks::{Landmark, Landmarks};
use crate::pose::sample;

/// Seam between the frame pipeline and whatever produces landmarks.
#[axum::async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// Landmarks for one encoded image. An empty frame means no person.
    async fn detect(&self, image: Bytes) -> Result<Landmarks, DetectorError>;

    fn mode(&self) -> DetectorMode;
}

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("detector request timed out")]
    Timeout,
    #[error("detector network error: {0}")]
    Network(String),
    #[error("detector api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("detector returned an invalid body: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Clone)]
pub struct DetectorClient {
    config: DetectorConfig,
    client: reqwest::Client,
}

impl DetectorClient {
    pub fn new(config: &DetectorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    pub fn shared(config: &DetectorConfig) -> Arc<dyn LandmarkDetector> {
        Arc::new(Self::new(config))
    }

    async fn post_image(&self, image: Bytes) -> Result<Landmarks, DetectorError> {
        let mut request = self
            .client
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DetectorError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: DetectResponse = response
            .json()
            .await
            .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;
        Ok(Landmarks::new(body.landmarks.unwrap_or_default()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> DetectorError {
    if e.is_timeout() {
        DetectorError::Timeout
    } else {
        DetectorError::Network(e.to_string())
    }
}

#[axum::async_trait]
impl LandmarkDetector for DetectorClient {
    async fn detect(&self, image: Bytes) -> Result<Landmarks, DetectorError> {
        match self.config.mode {
            DetectorMode::Disabled => Ok(Landmarks::empty()),
            DetectorMode::Mock => Ok(sample::standing_front()),
            DetectorMode::Http => self.post_image(image).await,
        }
    }

    fn mode(&self) -> DetectorMode {
        self.config.mode
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    use super::*;

    fn config(mode: DetectorMode, url: String, timeout_ms: u64) -> DetectorConfig {
        DetectorConfig {
            mode,
            url,
            api_key: String::new(),
            timeout_ms,
        }
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/detect")
    }

    #[tokio::test]
    async fn disabled_mode_sees_nobody() {
        let client = DetectorClient::new(&config(DetectorMode::Disabled, String::new(), 100));
        let landmarks = client.detect(Bytes::from_static(b"img")).await.unwrap();
        assert!(landmarks.is_empty());
    }

    #[tokio::test]
    async fn mock_mode_returns_standing_subject() {
        let client = DetectorClient::new(&config(DetectorMode::Mock, String::new(), 100));
        let landmarks = client.detect(Bytes::from_static(b"img")).await.unwrap();
        assert_eq!(landmarks, sample::standing_front());
        assert_eq!(client.mode(), DetectorMode::Mock);
    }

    #[tokio::test]
    async fn http_mode_posts_image_and_parses_landmarks() {
        let router = Router::new().route(
            "/detect",
            post(|body: Bytes| async move {
                assert_eq!(&body[..], b"jpeg-bytes");
                Json(serde_json::json!({
                    "landmarks": [{"x": 0.5, "y": 0.5, "z": 0.0, "visibility": 0.9}]
                }))
            }),
        );
        let url = serve(router).await;
        let client = DetectorClient::new(&config(DetectorMode::Http, url, 2_000));
        let landmarks = client
            .detect(Bytes::from_static(b"jpeg-bytes"))
            .await
            .unwrap();
        assert_eq!(landmarks.len(), 1);
        assert_eq!(landmarks.visibility(0), 0.9);
    }

    #[tokio::test]
    async fn missing_landmarks_field_means_no_person() {
        let router = Router::new().route(
            "/detect",
            post(|| async { Json(serde_json::json!({})) }),
        );
        let url = serve(router).await;
        let client = DetectorClient::new(&config(DetectorMode::Http, url, 2_000));
        assert!(client.detect(Bytes::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn http_errors_carry_the_status() {
        let router = Router::new().route(
            "/detect",
            post(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "loading model") }),
        );
        let url = serve(router).await;
        let client = DetectorClient::new(&config(DetectorMode::Http, url, 2_000));
        let err = client.detect(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, DetectorError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn slow_detector_times_out() {
        let router = Router::new().route(
            "/detect",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(serde_json::json!({ "landmarks": [] }))
            }),
        );
        let url = serve(router).await;
        let client = DetectorClient::new(&config(DetectorMode::Http, url, 50));
        let err = client.detect(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, DetectorError::Timeout));
    }
}
