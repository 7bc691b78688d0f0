mod google;

pub use google::GoogleProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// Options for a single image request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub count: u8,
    pub aspect_ratio: String,
    pub mime_type: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            count: 1,
            aspect_ratio: "16:9".to_string(),
            mime_type: "image/png".to_string(),
        }
    }
}

/// An image returned by the provider, still base64 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub base64_data: String,
}

impl GeneratedImage {
    /// Renderable `data:` URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

/// Unified trait for hosted generative-AI backends
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn provider_name(&self) -> &str;

    /// Generate text for `prompt`, optionally constrained to a JSON response schema
    async fn generate_text(
        &self,
        prompt: &str,
        response_schema: Option<&Value>,
    ) -> Result<String, ProviderError>;

    /// Generate one image for `prompt`
    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<GeneratedImage, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_image_options() {
        let options = ImageOptions::default();
        assert_eq!(options.count, 1);
        assert_eq!(options.aspect_ratio, "16:9");
        assert_eq!(options.mime_type, "image/png");
    }

    #[test]
    fn test_data_uri() {
        let image = GeneratedImage {
            mime_type: "image/png".to_string(),
            base64_data: "iVBORw0KGgo=".to_string(),
        };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }
}
