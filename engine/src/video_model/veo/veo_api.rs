use std::pin::Pin;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    job::{GenerationError, OperationHandle, OperationStatus, PollOperation},
    video_model::GenerationRequest,
};

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const MODEL: &str = "veo-3.1-fast-generate-preview";

#[derive(Debug, Deserialize)]
struct StartResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<Value>,
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSample {
    pub video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRef {
    pub uri: Option<String>,
}

impl Operation {
    fn into_status(self) -> OperationStatus {
        let Operation {
            name,
            done,
            error,
            response,
        } = self;

        let result_locator = response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        OperationStatus {
            handle: OperationHandle(name),
            done,
            result_locator,
            failure: error,
        }
    }
}

fn build_payload(req: &GenerationRequest) -> Value {
    let mut instance = json!({ "prompt": req.prompt });
    if let Some(image) = &req.reference_image {
        instance["image"] = json!({
            "bytesBase64Encoded": STANDARD.encode(&image.bytes),
            "mimeType": image.mime_type,
        });
    }

    json!({
        "instances": [instance],
        "parameters": {
            "sampleCount": 1,
            "resolution": "720p",
            "aspectRatio": "16:9",
        },
    })
}

/// Starts a Veo generation job and returns the operation handle.
pub async fn submit(
    req: &GenerationRequest,
    api_key: &str,
    client: &Client,
) -> Result<OperationHandle, GenerationError> {
    let resp = client
        .post(format!("{BASE_URL}/models/{MODEL}:predictLongRunning"))
        .header("x-goog-api-key", api_key)
        .json(&build_payload(req))
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(GenerationError::from_api_failure(status, body));
    }

    let start: StartResponse = serde_json::from_str(&body)?;
    Ok(OperationHandle(start.name))
}

/// Queries the current state of a running operation.
pub async fn poll(
    handle: &OperationHandle,
    api_key: &str,
    client: &Client,
) -> Result<OperationStatus, GenerationError> {
    let resp = client
        .get(format!("{BASE_URL}/{}", handle.0))
        .header("x-goog-api-key", api_key)
        .send()
        .await?;

    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(GenerationError::from_api_failure(status, body));
    }

    let operation: Operation = serde_json::from_str(&body)?;
    debug!("Poll response: {operation:#?}");
    Ok(operation.into_status())
}

pub struct Operations<'c> {
    pub api_key: &'c str,
    pub client: &'c Client,
}

impl PollOperation for Operations<'_> {
    fn poll<'a>(
        &'a self,
        handle: &'a OperationHandle,
    ) -> Pin<Box<dyn Future<Output = Result<OperationStatus, GenerationError>> + Send + 'a>> {
        Box::pin(poll(handle, self.api_key, self.client))
    }
}

/// Downloads the finished video. The result locator already carries
/// query parameters, the key is appended as one more.
pub async fn download(
    video_url: &str,
    api_key: &str,
    client: &Client,
) -> Result<Vec<u8>, GenerationError> {
    let resp = client
        .get(format!("{video_url}&key={api_key}"))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await?;
        return Err(GenerationError::from_api_failure(status, body));
    }

    Ok(resp.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::video_model::{AnimationCategory, ReferenceImage};

    #[test]
    fn payload_serialization_text_to_video() {
        let req = GenerationRequest {
            prompt: "A sunset over the ocean".into(),
            reference_image: None,
            category: AnimationCategory::TextToVideo,
        };

        let expect = expect![[
            r#"{"instances":[{"prompt":"A sunset over the ocean"}],"parameters":{"aspectRatio":"16:9","resolution":"720p","sampleCount":1}}"#
        ]];
        expect.assert_eq(&serde_json::to_string(&build_payload(&req)).unwrap());
    }

    #[test]
    fn payload_serialization_with_reference_image() {
        let req = GenerationRequest {
            prompt: "logo spin".into(),
            reference_image: Some(ReferenceImage {
                bytes: vec![1, 2, 3],
                mime_type: "image/png".into(),
            }),
            category: AnimationCategory::LogoAnimation,
        };

        let expect = expect![[
            r#"{"instances":[{"image":{"bytesBase64Encoded":"AQID","mimeType":"image/png"},"prompt":"logo spin"}],"parameters":{"aspectRatio":"16:9","resolution":"720p","sampleCount":1}}"#
        ]];
        expect.assert_eq(&serde_json::to_string(&build_payload(&req)).unwrap());
    }

    #[test]
    fn finished_operation_yields_the_video_uri() {
        let operation: Operation = serde_json::from_str(
            r#"{
                "name": "models/veo/operations/abc",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [{"video": {"uri": "https://x/video?op=1"}}]
                    }
                }
            }"#,
        )
        .unwrap();

        let status = operation.into_status();
        assert!(status.done);
        assert_eq!(status.handle, OperationHandle("models/veo/operations/abc".into()));
        assert_eq!(status.result_locator.as_deref(), Some("https://x/video?op=1"));
    }

    #[test]
    fn running_operation_has_no_locator() {
        let operation: Operation =
            serde_json::from_str(r#"{"name": "models/veo/operations/abc"}"#).unwrap();

        let status = operation.into_status();
        assert!(!status.done);
        assert_eq!(status.result_locator, None);
        assert_eq!(status.failure, None);
    }

    #[test]
    fn finished_operation_without_samples() {
        let operation: Operation = serde_json::from_str(
            r#"{
                "name": "models/veo/operations/abc",
                "done": true,
                "error": {"code": 13, "message": "internal"},
                "response": {"generateVideoResponse": {"generatedSamples": []}}
            }"#,
        )
        .unwrap();

        let status = operation.into_status();
        assert!(status.done);
        assert_eq!(status.result_locator, None);
        assert!(status.failure.is_some());
    }
}
