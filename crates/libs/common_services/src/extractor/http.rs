use super::{DescriptorExtractor, ExtractionError};
use async_trait::async_trait;
use common_types::{BoundingRegion, Descriptor, DetectedFace, ModelVersion};
use image::{DynamicImage, ImageFormat};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::io::Cursor;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponse {
    model_version: String,
    faces: Vec<ExtractedFace>,
}

#[derive(Debug, Deserialize)]
struct ExtractedFace {
    descriptor: Vec<f32>,
    confidence: f32,
    region: BoundingRegion,
}

/// Talks to a face analysis service that accepts a JPEG body and answers with the faces
/// it found.
#[derive(Clone)]
pub struct HttpFaceExtractor {
    http_client: Client,
    endpoint: Url,
    model_version: ModelVersion,
}

impl HttpFaceExtractor {
    #[must_use]
    pub const fn new(http_client: Client, endpoint: Url, model_version: ModelVersion) -> Self {
        Self {
            http_client,
            endpoint,
            model_version,
        }
    }
}

#[async_trait]
impl DescriptorExtractor for HttpFaceExtractor {
    async fn extract(&self, image: &DynamicImage) -> Result<Vec<DetectedFace>, ExtractionError> {
        let owned = image.clone();
        let body = tokio::task::spawn_blocking(move || encode_jpeg(&owned)).await??;
        debug!("Sending {} byte image to {}", body.len(), self.endpoint);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "image/jpeg")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ServiceError { status, message });
        }

        let parsed: ExtractResponse = response.json().await?;
        into_detected_faces(parsed, &self.model_version)
    }
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ExtractionError> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)?;
    Ok(buffer)
}

/// Validates every returned descriptor against the configured model. A single bad
/// descriptor fails the whole extraction, nothing is truncated or padded.
fn into_detected_faces(
    response: ExtractResponse,
    model_version: &ModelVersion,
) -> Result<Vec<DetectedFace>, ExtractionError> {
    if response.model_version != model_version.name {
        return Err(ExtractionError::ModelMismatch {
            expected: model_version.name.clone(),
            actual: response.model_version,
        });
    }
    response
        .faces
        .into_iter()
        .map(|face| {
            Ok(DetectedFace {
                descriptor: Descriptor::new(model_version, face.descriptor)?,
                confidence: face.confidence,
                region: face.region,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::DescriptorError;
    use serde_json::json;

    fn model() -> ModelVersion {
        ModelVersion::new("facenet-test", 3)
    }

    fn response(value: serde_json::Value) -> ExtractResponse {
        serde_json::from_value(value).expect("valid response json")
    }

    #[test]
    fn converts_faces() {
        let parsed = response(json!({
            "modelVersion": "facenet-test",
            "faces": [{
                "descriptor": [0.1, 0.2, 0.3],
                "confidence": 0.97,
                "region": { "x": 0.1, "y": 0.2, "width": 0.3, "height": 0.4 }
            }]
        }));

        let faces = into_detected_faces(parsed, &model()).expect("faces");

        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].descriptor.values(), &[0.1_f32, 0.2, 0.3][..]);
        assert!((faces[0].confidence - 0.97).abs() < f32::EPSILON);
    }

    #[test]
    fn no_faces_is_not_an_error() {
        let parsed = response(json!({ "modelVersion": "facenet-test", "faces": [] }));
        assert!(into_detected_faces(parsed, &model()).expect("empty").is_empty());
    }

    #[test]
    fn rejects_other_model() {
        let parsed = response(json!({ "modelVersion": "arcface", "faces": [] }));
        assert!(matches!(
            into_detected_faces(parsed, &model()),
            Err(ExtractionError::ModelMismatch { .. })
        ));
    }

    #[test]
    fn rejects_short_descriptor() {
        let parsed = response(json!({
            "modelVersion": "facenet-test",
            "faces": [{
                "descriptor": [0.1, 0.2],
                "confidence": 0.9,
                "region": { "x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0 }
            }]
        }));
        assert!(matches!(
            into_detected_faces(parsed, &model()),
            Err(ExtractionError::InvalidDescriptor(
                DescriptorError::DimensionMismatch { .. }
            ))
        ));
    }

    #[test]
    fn encodes_images_with_alpha() {
        let image = DynamicImage::new_rgba8(8, 8);
        let jpeg = encode_jpeg(&image).expect("jpeg");
        assert_eq!(&jpeg[..2], &[0xFF_u8, 0xD8]);
    }
}
