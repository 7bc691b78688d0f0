use crate::config::GoogleConfig;
use crate::error::ProviderError;
use crate::gate::CredentialStore;
use crate::providers::{GeneratedImage, GenerativeProvider, ImageOptions};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini (text) and Imagen (image) provider
pub struct GoogleProvider {
    client: Client,
    credentials: CredentialStore,
    base_url: String,
    text_model: String,
    image_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google provider from configuration
    ///
    /// The API key is not captured here: it is resolved from `credentials`
    /// on every call so a key selected at runtime takes effect immediately.
    pub fn new(
        config: &GoogleConfig,
        credentials: CredentialStore,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(GoogleProvider {
            client,
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ProviderError> {
        let api_key = self
            .credentials
            .current()
            .ok_or(ProviderError::MissingCredential)?;

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.without_url()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.without_url()))?;
        debug!("Google response ({}): {}", status, text);

        let response_body: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) if status >= 400 => {
                return Err(ProviderError::Api {
                    status,
                    message: text,
                })
            }
            Err(e) => return Err(ProviderError::Parse(e.to_string())),
        };

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let code = error["code"]
                .as_u64()
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(status);
            let message = error["message"].as_str().unwrap_or("Unknown error");
            let reason = error["status"].as_str().unwrap_or_default();
            return Err(ProviderError::Api {
                status: code,
                message: format!("{} {}", reason, message).trim().to_string(),
            });
        }

        if status >= 400 {
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        Ok(response_body)
    }
}

#[async_trait]
impl GenerativeProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate_text(
        &self,
        prompt: &str,
        response_schema: Option<&Value>,
    ) -> Result<String, ProviderError> {
        let mut generation_config = json!({
            "temperature": self.temperature,
            "maxOutputTokens": self.max_tokens
        });
        if let Some(schema) = response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": generation_config
        });

        let url = self.endpoint(&self.text_model, "generateContent");
        let response_body = self.post(&url, &body).await?;

        let text = response_body["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty());

        match text {
            Some(text) => Ok(text),
            None => {
                let reason = response_body["promptFeedback"]["blockReason"]
                    .as_str()
                    .or_else(|| response_body["candidates"][0]["finishReason"].as_str())
                    .unwrap_or("no text in response");
                Err(ProviderError::Parse(format!(
                    "Failed to extract content from Gemini response: {}",
                    reason
                )))
            }
        }
    }

    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<GeneratedImage, ProviderError> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": options.count,
                "aspectRatio": options.aspect_ratio,
                "outputOptions": { "mimeType": options.mime_type }
            }
        });

        let url = self.endpoint(&self.image_model, "predict");
        let response_body = self.post(&url, &body).await?;

        let prediction = &response_body["predictions"][0];
        let base64_data = prediction["bytesBase64Encoded"]
            .as_str()
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                let reason = prediction["raiFilteredReason"]
                    .as_str()
                    .unwrap_or("no image data in Imagen response");
                ProviderError::Parse(reason.to_string())
            })?;

        Ok(GeneratedImage {
            mime_type: prediction["mimeType"]
                .as_str()
                .unwrap_or(&options.mime_type)
                .to_string(),
            base64_data: base64_data.to_string(),
        })
    }
}
