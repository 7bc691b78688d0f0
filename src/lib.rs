pub mod capture;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod generator;
pub mod model;
pub mod orchestrator;
pub mod presentation;
pub mod prompt;
pub mod providers;
pub mod schema;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

// Re-export commonly used types
pub use capture::IngredientCapture;
pub use config::AppConfig;
pub use error::{ErrorKind, GenerationError, ProviderError};
pub use gate::{CredentialGate, CredentialStore};
pub use generator::RecipeGenerator;
pub use model::{GenerationRequest, Recipe};
pub use orchestrator::{AppState, Orchestrator, SubmitOutcome};
pub use session::Session;

use crate::providers::GoogleProvider;

/// Build a generation client backed by the Google APIs
pub fn google_generator(
    config: &AppConfig,
    credentials: CredentialStore,
) -> Result<RecipeGenerator, ProviderError> {
    let provider = GoogleProvider::new(
        &config.google,
        credentials,
        Duration::from_secs(config.timeout),
    )?;
    Ok(RecipeGenerator::new(Arc::new(provider)))
}

/// Build an orchestrator wired to the Google APIs, with its credential gate
/// already checked
pub fn orchestrator_from_config(config: &AppConfig) -> Result<Orchestrator, ProviderError> {
    let credentials = CredentialStore::new(config.google.api_key.clone());
    let generator = google_generator(config, credentials.clone())?;
    let mut orchestrator = Orchestrator::new(
        generator,
        CredentialGate::new(config.credential_gate, credentials),
        Duration::from_millis(config.progress_delay_ms),
    );
    orchestrator.check_credential();
    Ok(orchestrator)
}

/// One-shot generation of recipe text with the default configuration
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let recipes = pantry_chef::generate_recipes(&["عدس".to_string(), "بصل".to_string()], &[], 3).await?;
/// for recipe in recipes {
///     println!("{}", recipe.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate_recipes(
    ingredients: &[String],
    dietary_restrictions: &[String],
    count: u8,
) -> Result<Vec<Recipe>, Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let credentials = CredentialStore::new(config.google.api_key.clone());
    let generator = google_generator(&config, credentials)?;
    Ok(generator
        .generate_recipes(ingredients, dietary_restrictions, count)
        .await?)
}
