use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::error::GenerationError;
use crate::extract::parse_recipes;
use crate::model::Recipe;
use crate::prompt::{image_prompt, recipes_prompt, variations_prompt};
use crate::providers::{GenerativeProvider, ImageOptions};
use crate::schema::recipe_list_schema;

/// Generation client: prompts, schema, response repair and error classification
/// on top of a [`GenerativeProvider`]
#[derive(Clone)]
pub struct RecipeGenerator {
    provider: Arc<dyn GenerativeProvider>,
    image_options: ImageOptions,
}

impl RecipeGenerator {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self {
            provider,
            image_options: ImageOptions::default(),
        }
    }

    pub fn with_image_options(mut self, options: ImageOptions) -> Self {
        self.image_options = options;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Ask the text model for `count` recipes built from `ingredients`
    pub async fn generate_recipes(
        &self,
        ingredients: &[String],
        dietary_restrictions: &[String],
        count: u8,
    ) -> Result<Vec<Recipe>, GenerationError> {
        let prompt = recipes_prompt(ingredients, dietary_restrictions, count);
        let schema = recipe_list_schema();
        debug!("Recipe prompt: {}", prompt);

        let text = self
            .provider
            .generate_text(&prompt, Some(&schema))
            .await
            .map_err(|e| {
                error!("Error generating recipes: {}", e);
                GenerationError::classify(&e, GenerationError::RecipesFailed)
            })?;

        let recipes = parse_recipes(&text).map_err(|e| {
            error!("Error parsing recipes: {}", e);
            GenerationError::RecipesFailed
        })?;

        if recipes.is_empty() {
            error!("Model returned an empty recipe list");
            return Err(GenerationError::RecipesFailed);
        }

        info!(
            "Generated {} recipes with {}",
            recipes.len(),
            self.provider_name()
        );
        Ok(recipes)
    }

    /// Generate a dish photo for `title`, returning a `data:` URI
    pub async fn try_generate_image(&self, title: &str) -> Result<String, GenerationError> {
        self.provider
            .generate_image(&image_prompt(title), &self.image_options)
            .await
            .map(|image| image.to_data_uri())
            .map_err(|e| {
                warn!("Error generating image for {}: {}", title, e);
                GenerationError::classify(&e, GenerationError::ImageFailed)
            })
    }

    /// Like [`try_generate_image`](Self::try_generate_image), but a failure
    /// only yields `None`
    pub async fn generate_image(&self, title: &str) -> Option<String> {
        self.try_generate_image(title).await.ok()
    }

    /// Ask for 2-3 prose variation suggestions for `recipe`
    pub async fn generate_variations(&self, recipe: &Recipe) -> Result<String, GenerationError> {
        let text = self
            .provider
            .generate_text(&variations_prompt(recipe), None)
            .await
            .map_err(|e| {
                error!("Error generating variations: {}", e);
                GenerationError::classify(&e, GenerationError::VariationsFailed)
            })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::VariationsFailed);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::providers::GeneratedImage;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Provider answering every text call with `text` and recording prompts
    struct CannedProvider {
        text: Result<String, u16>,
        image: Option<String>,
        prompts: Mutex<Vec<String>>,
        schemas: Mutex<Vec<Option<Value>>>,
    }

    impl CannedProvider {
        fn text(text: &str) -> Self {
            Self {
                text: Ok(text.to_string()),
                image: Some("aGVsbG8=".to_string()),
                prompts: Mutex::new(Vec::new()),
                schemas: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                text: Err(status),
                image: None,
                prompts: Mutex::new(Vec::new()),
                schemas: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeProvider for CannedProvider {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn generate_text(
            &self,
            prompt: &str,
            response_schema: Option<&Value>,
        ) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.schemas.lock().unwrap().push(response_schema.cloned());
            match &self.text {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ProviderError::Api {
                    status: *status,
                    message: "failure".to_string(),
                }),
            }
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            options: &ImageOptions,
        ) -> Result<GeneratedImage, ProviderError> {
            match &self.image {
                Some(data) => Ok(GeneratedImage {
                    mime_type: options.mime_type.clone(),
                    base64_data: data.clone(),
                }),
                None => Err(ProviderError::Parse("no image".to_string())),
            }
        }
    }

    const BODY: &str = r#"Here you go:
[{"title":"كبسة","description":"d","ingredients":["أرز"],"instructions":["اطبخ"],"servings":"4","prepTime":"1h"},
 {"title":"سلطة","description":"d","ingredients":["خس"],"instructions":["قطع"],"servings":"2","prepTime":"5m"}]
Enjoy!"#;

    #[tokio::test]
    async fn test_recipes_are_parsed_from_wrapped_output() {
        let provider = Arc::new(CannedProvider::text(BODY));
        let generator = RecipeGenerator::new(provider.clone());

        let recipes = generator
            .generate_recipes(&["أرز".to_string()], &["نباتي".to_string()], 2)
            .await
            .unwrap();
        assert_eq!(recipes.len(), 2);

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("نباتي"));
        let schemas = provider.schemas.lock().unwrap();
        assert!(schemas[0].is_some());
    }

    #[tokio::test]
    async fn test_unparseable_output_is_a_generic_failure() {
        let generator = RecipeGenerator::new(Arc::new(CannedProvider::text("[{\"title\":")));
        let err = generator
            .generate_recipes(&["أرز".to_string()], &[], 3)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::RecipesFailed);
    }

    #[tokio::test]
    async fn test_empty_array_is_a_failure() {
        let generator = RecipeGenerator::new(Arc::new(CannedProvider::text("[]")));
        let err = generator
            .generate_recipes(&["أرز".to_string()], &[], 3)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::RecipesFailed);
    }

    #[tokio::test]
    async fn test_credential_failures_are_classified() {
        let generator = RecipeGenerator::new(Arc::new(CannedProvider::failing(401)));
        let err = generator
            .generate_recipes(&["أرز".to_string()], &[], 3)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Credential);

        let generator = RecipeGenerator::new(Arc::new(CannedProvider::failing(500)));
        let err = generator
            .generate_recipes(&["أرز".to_string()], &[], 3)
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::RecipesFailed);
    }

    #[tokio::test]
    async fn test_image_failure_is_swallowed() {
        let generator = RecipeGenerator::new(Arc::new(CannedProvider::failing(500)));
        assert_eq!(generator.generate_image("كبسة").await, None);
        assert_eq!(
            generator.try_generate_image("كبسة").await,
            Err(GenerationError::ImageFailed)
        );

        let generator = RecipeGenerator::new(Arc::new(CannedProvider::text("")));
        assert_eq!(
            generator.generate_image("كبسة").await.as_deref(),
            Some("data:image/png;base64,aGVsbG8=")
        );
    }

    #[tokio::test]
    async fn test_variations_are_trimmed_prose() {
        let provider = Arc::new(CannedProvider::text("  ١. نسخة حارة\n٢. نسخة نباتية \n"));
        let generator = RecipeGenerator::new(provider.clone());
        let recipes = parse_recipes(BODY).unwrap();

        let text = generator.generate_variations(&recipes[0]).await.unwrap();
        assert_eq!(text, "١. نسخة حارة\n٢. نسخة نباتية");
        assert!(provider.prompts.lock().unwrap()[0].contains("كبسة"));
        assert!(provider.schemas.lock().unwrap()[0].is_none());
    }

    #[tokio::test]
    async fn test_blank_variations_are_a_failure() {
        let generator = RecipeGenerator::new(Arc::new(CannedProvider::text("   ")));
        let recipes = parse_recipes(BODY).unwrap();
        assert_eq!(
            generator.generate_variations(&recipes[1]).await,
            Err(GenerationError::VariationsFailed)
        );
    }
}
