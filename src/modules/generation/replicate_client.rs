use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{DownloadedImage, GeneratedImage, ImageGenerator};
use crate::core::config::GenerationConfig;
use crate::core::error::{AppError, Result};

/// Prediction resource returned by the Replicate API
#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

impl Prediction {
    /// First output URL; models return either a single URL or a list
    fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(url) => Some(url.clone()),
            Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        }
    }
}

pub struct ReplicateClient {
    client: Client,
    config: GenerationConfig,
}

impl ReplicateClient {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn input(&self, prompt: &str) -> Value {
        json!({
            "prompt": prompt,
            "aspect_ratio": self.config.aspect_ratio,
            "output_format": self.config.output_format,
            "num_outputs": 1,
        })
    }

    async fn create_prediction(&self, input: &Value) -> Result<Prediction> {
        let url = format!(
            "{}/models/{}/predictions",
            self.config.api_base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_token)
            // Hold the connection until the prediction finishes, when it is quick
            .header("Prefer", "wait")
            .json(&json!({ "input": input }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Replicate request failed: {:?}", e);
                AppError::ExternalServiceError("Image provider is unreachable".to_string())
            })?;

        Self::parse(response).await
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        let url = format!("{}/predictions/{}", self.config.api_base_url, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Replicate poll failed for {}: {:?}", id, e);
                AppError::ExternalServiceError("Image provider is unreachable".to_string())
            })?;

        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Replicate returned {}: {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Image provider returned HTTP {}",
                status.as_u16()
            )));
        }

        response.json::<Prediction>().await.map_err(|e| {
            tracing::error!("Failed to parse Replicate response: {:?}", e);
            AppError::ExternalServiceError("Invalid response from image provider".to_string())
        })
    }
}

#[async_trait]
impl ImageGenerator for ReplicateClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let input = self.input(prompt);
        let mut prediction = self.create_prediction(&input).await?;

        let mut polls = 0;
        while !prediction.status.is_terminal() {
            if polls >= self.config.max_polls {
                tracing::warn!(
                    "Prediction {} still {:?} after {} polls",
                    prediction.id,
                    prediction.status,
                    polls
                );
                return Err(AppError::ExternalServiceError(
                    "Image generation timed out".to_string(),
                ));
            }
            tokio::time::sleep(self.config.poll_interval).await;
            prediction = self.get_prediction(&prediction.id).await?;
            polls += 1;
        }

        if prediction.status != PredictionStatus::Succeeded {
            tracing::error!(
                "Prediction {} ended as {:?}: {:?}",
                prediction.id,
                prediction.status,
                prediction.error
            );
            return Err(AppError::ExternalServiceError(
                "Image generation failed".to_string(),
            ));
        }

        let url = prediction.output_url().ok_or_else(|| {
            tracing::error!("Prediction {} succeeded without output", prediction.id);
            AppError::ExternalServiceError("Image provider returned no image".to_string())
        })?;

        tracing::info!("Prediction {} succeeded after {} polls", prediction.id, polls);

        Ok(GeneratedImage {
            url,
            model: self.config.model.clone(),
            size: self.config.aspect_ratio.clone(),
            params: input,
        })
    }

    async fn download(&self, url: &str) -> Result<DownloadedImage> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to download generated image {}: {:?}", url, e);
            AppError::ExternalServiceError("Failed to fetch generated image".to_string())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                "Generated image download returned {} for {}",
                response.status(),
                url
            );
            return Err(AppError::ExternalServiceError(
                "Failed to fetch generated image".to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "image/png".to_string());

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read generated image body: {:?}", e);
            AppError::ExternalServiceError("Failed to fetch generated image".to_string())
        })?;

        Ok(DownloadedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
