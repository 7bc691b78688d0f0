use thiserror::Error;

/// User-facing message when the recipe batch could not be produced
pub const RECIPES_FAILED_MESSAGE: &str = "فشل إنشاء الوصفات. يرجى المحاولة مرة أخرى.";

/// User-facing message when variation suggestions could not be produced
pub const VARIATIONS_FAILED_MESSAGE: &str = "فشل في اقتراح تنويعات.";

/// User-facing message when a dish photo could not be produced
pub const IMAGE_FAILED_MESSAGE: &str = "تعذر إنشاء صورة الطبق.";

/// User-facing message when the API key is missing or rejected
pub const CREDENTIAL_MESSAGE: &str =
    "مفتاح API غير صالح أو غير مُعد. تحقق من إعداد GEMINI_API_KEY أو اختر مفتاحاً آخر.";

/// Error fragments the Google APIs use when a key is missing, invalid or lacks access
const CREDENTIAL_MARKERS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "api key expired",
    "permission_denied",
    "permission denied",
    "unauthenticated",
    "requested entity was not found",
    "no api key configured",
];

/// Broad error categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The credential is missing, invalid or not permitted
    Credential,
    /// Transport, API or parse failure
    Failure,
}

/// Errors raised at the provider seam (HTTP, API and response decoding)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The HTTP request itself failed
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with an error status or error body
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response could not be decoded into the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// No API key is available at call time
    #[error("No API key configured")]
    MissingCredential,
}

impl ProviderError {
    /// Whether this failure means the credential must be replaced
    pub fn is_credential(&self) -> bool {
        match self {
            ProviderError::MissingCredential => true,
            ProviderError::Api { status, message } => {
                matches!(status, 401 | 403) || is_credential_message(message)
            }
            ProviderError::RequestFailed(e) => is_credential_message(&e.to_string()),
            ProviderError::Parse(_) => false,
        }
    }
}

/// Inspect error text for the markers of a credential problem
pub fn is_credential_message(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CREDENTIAL_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Classified, user-facing generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{}", CREDENTIAL_MESSAGE)]
    Credential,

    #[error("{}", RECIPES_FAILED_MESSAGE)]
    RecipesFailed,

    #[error("{}", IMAGE_FAILED_MESSAGE)]
    ImageFailed,

    #[error("{}", VARIATIONS_FAILED_MESSAGE)]
    VariationsFailed,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Credential => ErrorKind::Credential,
            _ => ErrorKind::Failure,
        }
    }

    /// Map a provider failure to its classified form, using `fallback` for
    /// anything that is not a credential problem
    pub fn classify(err: &ProviderError, fallback: GenerationError) -> GenerationError {
        if err.is_credential() {
            GenerationError::Credential
        } else {
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_markers_are_case_insensitive() {
        assert!(is_credential_message(
            "API key not valid. Please pass a valid API key."
        ));
        assert!(is_credential_message("status: PERMISSION_DENIED"));
        assert!(is_credential_message("Requested entity was not found."));
        assert!(!is_credential_message("Internal error encountered."));
    }

    #[test]
    fn test_provider_error_credential_detection() {
        let unauthorized = ProviderError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert!(unauthorized.is_credential());

        let bad_key = ProviderError::Api {
            status: 400,
            message: "API key not valid".to_string(),
        };
        assert!(bad_key.is_credential());

        let overloaded = ProviderError::Api {
            status: 503,
            message: "The model is overloaded".to_string(),
        };
        assert!(!overloaded.is_credential());

        assert!(ProviderError::MissingCredential.is_credential());
        assert!(!ProviderError::Parse("no array".to_string()).is_credential());
    }

    #[test]
    fn test_classify_uses_fallback_for_generic_failures() {
        let err = ProviderError::Parse("truncated".to_string());
        assert_eq!(
            GenerationError::classify(&err, GenerationError::RecipesFailed),
            GenerationError::RecipesFailed
        );
        assert_eq!(
            GenerationError::classify(
                &ProviderError::MissingCredential,
                GenerationError::VariationsFailed
            ),
            GenerationError::Credential
        );
    }

    #[test]
    fn test_kind_and_messages() {
        assert_eq!(GenerationError::Credential.kind(), ErrorKind::Credential);
        assert_eq!(GenerationError::RecipesFailed.kind(), ErrorKind::Failure);
        assert_eq!(
            GenerationError::RecipesFailed.to_string(),
            RECIPES_FAILED_MESSAGE
        );
        assert_ne!(
            GenerationError::Credential.to_string(),
            GenerationError::RecipesFailed.to_string()
        );
    }
}
