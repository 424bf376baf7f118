use crate::config::Config;
use crate::error::{AppError, InferenceError, Result};
use crate::model::ModelChoice;
use crate::selection::ImageSelection;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Outcome of one inference attempt.
pub type InferenceOutcome = std::result::Result<InferenceResult, InferenceError>;

/// A successful depth prediction, exactly as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// URL or data URI of the rendered depth image.
    pub depth_map: String,
    /// Time the service spent on inference, in seconds.
    pub inference_time_s: f64,
    /// Identifier of the model the service actually ran.
    pub model: String,
}

/// One upload, built at submit time and consumed by the call.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub image: Bytes,
    pub file_name: String,
    pub mime_type: String,
    pub model: ModelChoice,
}

impl InferenceRequest {
    pub fn new(selection: &ImageSelection, model: ModelChoice) -> Self {
        Self {
            image: selection.bytes().clone(),
            file_name: selection.file_name().to_string(),
            mime_type: selection.mime_type().to_string(),
            model,
        }
    }

    /// Multipart body with the image under `image` and the model under `model`.
    pub fn into_form(self) -> Form {
        let len = self.image.len() as u64;
        let part = Part::stream_with_length(self.image.clone(), len)
            .file_name(self.file_name.clone());
        // Declared types that are not valid media types go out untyped.
        let part = part.mime_str(&self.mime_type).unwrap_or_else(|_| {
            Part::stream_with_length(self.image, len).file_name(self.file_name)
        });

        Form::new()
            .part("image", part)
            .text("model", self.model.as_str())
    }
}

/// HTTP client for the depth prediction service.
#[derive(Clone, Debug)]
pub struct DepthClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl DepthClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.predict_url()?,
        })
    }

    /// The prediction endpoint this client posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The underlying HTTP client, shared for fetching depth maps.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Uploads the image and interprets the service's answer.
    ///
    /// Issues exactly one request. No retries.
    pub async fn predict_depth(&self, request: InferenceRequest) -> InferenceOutcome {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            size = request.image.len(),
            "submitting depth prediction"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(request.into_form())
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "depth service unreachable");
                InferenceError::TransportUnavailable
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            debug!(error = %e, "failed to read response body");
            InferenceError::TransportUnavailable
        })?;

        if !status.is_success() {
            let message = error_message(&body);
            debug!(%status, ?message, "depth service rejected request");
            return Err(InferenceError::rejected(status, message));
        }

        let result: InferenceResult = serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, "unreadable success body");
            InferenceError::TransportUnavailable
        })?;

        info!(
            model = %result.model,
            inference_time_s = result.inference_time_s,
            "depth map received"
        );
        Ok(result)
    }
}

/// The non-empty string `error` field of a JSON body, if there is one.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("error")?
        .as_str()
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_reads_string_field_only() {
        assert_eq!(error_message(br#"{"error":"bad image"}"#).as_deref(), Some("bad image"));
        assert_eq!(error_message(br#"{"error":42}"#), None);
        assert_eq!(error_message(br#"{"error":""}"#), None);
        assert_eq!(error_message(br#"{"detail":"x"}"#), None);
        assert_eq!(error_message(b"<html>502</html>"), None);
    }

    #[test]
    fn result_keeps_values_verbatim() {
        let result: InferenceResult = serde_json::from_str(
            r#"{"depth_map":"X","inference_time_s":1.23,"model":"deeplearning","extra":true}"#,
        )
        .unwrap();
        assert_eq!(
            result,
            InferenceResult {
                depth_map: "X".into(),
                inference_time_s: 1.23,
                model: "deeplearning".into(),
            }
        );
    }

    #[test]
    fn client_targets_predict_endpoint() {
        let config = Config::builder().with_api_url("http://127.0.0.1:9").build().unwrap();
        let client = DepthClient::new(&config).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:9/predict-depth");
    }
}
