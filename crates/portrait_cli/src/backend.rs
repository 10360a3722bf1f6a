//! HTTP adapter for the external face/emotion model.

use anyhow::{Context, Result};
use async_trait::async_trait;
use portrait_core::config::BackendConfig;
use portrait_core::{FaceAnalysis, FaceBackend, GrayImage};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Posts raw image bytes to the model service and reads back one face.
///
/// The service answers `{"face": {...}}`, or `{"face": null}` / HTTP 404 / HTTP 422
/// when the image holds no usable face.
pub struct HttpFaceBackend {
    client: Client,
    url: String,
}

#[derive(Deserialize)]
struct BackendResponse {
    face: Option<FaceAnalysis>,
}

impl HttpFaceBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build face backend HTTP client")?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl FaceBackend for HttpFaceBackend {
    async fn detect(&self, image: &[u8]) -> Result<Option<FaceAnalysis>> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .context("Face backend request failed")?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::debug!("Face backend found no face (HTTP {})", response.status());
                return Ok(None);
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Face backend returned HTTP {}: {}", status, body);
            }
            _ => {}
        }

        let body: BackendResponse = response
            .json()
            .await
            .context("Face backend returned malformed JSON")?;
        Ok(body.face)
    }
}

/// Decode an uploaded photo into its luma plane.
pub fn decode_luma(bytes: &[u8]) -> Result<GrayImage> {
    let luma = image::load_from_memory(bytes)
        .context("Unsupported or corrupt image")?
        .to_luma8();
    let (width, height) = luma.dimensions();
    GrayImage::new(width, height, luma.into_raw())
        .context("Decoded image has inconsistent dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_for(server: &MockServer) -> HttpFaceBackend {
        HttpFaceBackend::new(&BackendConfig {
            url: format!("{}/analyze", server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_face_is_parsed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "face": {
                    "age": 33,
                    "gender": "Woman",
                    "dominant_emotion": "happy",
                    "emotion": {"happy": 80.0, "sad": 5.0, "neutral": 15.0}
                }
            })))
            .mount(&mock_server)
            .await;

        let face = backend_for(&mock_server).await.detect(b"jpeg").await.unwrap().unwrap();
        assert_eq!(face.age, 33);
        assert_eq!(face.emotion.get("happy"), Some(80.0));
        assert!(face.landmarks.is_none());
    }

    #[tokio::test]
    async fn test_no_face_variants() {
        for template in [
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"face": null})),
            ResponseTemplate::new(404),
            ResponseTemplate::new(422),
        ] {
            let mock_server = MockServer::start().await;
            Mock::given(method("POST")).respond_with(template).mount(&mock_server).await;
            let result = backend_for(&mock_server).await.detect(b"jpeg").await.unwrap();
            assert!(result.is_none());
        }
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&mock_server)
            .await;
        let err = backend_for(&mock_server).await.detect(b"jpeg").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_decode_luma() {
        let img = image::RgbImage::from_fn(4, 3, |x, _| {
            image::Rgb([if x % 2 == 0 { 255 } else { 0 }; 3])
        });
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let gray = decode_luma(bytes.get_ref()).unwrap();
        assert_eq!((gray.width, gray.height), (4, 3));
        assert_eq!(gray.get(0, 0), 255);
        assert_eq!(gray.get(1, 0), 0);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_luma(b"not an image").is_err());
    }
}
