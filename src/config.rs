use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Google generative AI settings
    #[serde(default)]
    pub google: GoogleConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Pause between the "analyzing" and "generating" progress steps
    #[serde(default = "default_progress_delay_ms")]
    pub progress_delay_ms: u64,
    /// Number of recipes requested when the user does not choose one
    #[serde(default = "default_recipe_count")]
    pub default_recipe_count: u8,
    /// Require a confirmed API key before any generation call
    #[serde(default = "default_credential_gate")]
    pub credential_gate: bool,
}

/// Configuration for the Google Gemini / Imagen endpoints
#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    /// API key for authentication (can also be set via GEMINI_API_KEY or API_KEY)
    pub api_key: Option<String>,
    /// Base URL for the API (override for proxies and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for recipe and variation text
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model used for dish photos
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google: GoogleConfig::default(),
            timeout: default_timeout(),
            progress_delay_ms: default_progress_delay_ms(),
            default_recipe_count: default_recipe_count(),
            credential_gate: default_credential_gate(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_timeout() -> u64 {
    60
}

fn default_progress_delay_ms() -> u64 {
    500
}

fn default_recipe_count() -> u8 {
    3
}

fn default_credential_gate() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PANTRY_CHEF__ prefix
    /// 2. pantry-chef.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PANTRY_CHEF__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config("pantry-chef")
    }
}

/// Load configuration from `<name>.toml` (optional) and environment variables
pub fn load_config(name: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name(name).required(false))
        // Use double underscore for nested: PANTRY_CHEF__GOOGLE__API_KEY
        .add_source(
            Environment::with_prefix("PANTRY_CHEF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
