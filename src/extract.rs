//! Repair step for model output: the recipe array is cut out of any prose the
//! model wraps around it before it is parsed.

use crate::error::ProviderError;
use crate::model::Recipe;

/// Return the slice from the first `[` to the last `]`
pub fn extract_json_array(text: &str) -> Result<&str, ProviderError> {
    let start = text
        .find('[')
        .ok_or_else(|| ProviderError::Parse("no opening bracket in model output".to_string()))?;
    let end = text
        .rfind(']')
        .ok_or_else(|| ProviderError::Parse("no closing bracket in model output".to_string()))?;

    if end < start {
        return Err(ProviderError::Parse(
            "closing bracket precedes opening bracket in model output".to_string(),
        ));
    }

    Ok(&text[start..=end])
}

/// Extract and decode the recipe list from raw model output
pub fn parse_recipes(text: &str) -> Result<Vec<Recipe>, ProviderError> {
    let json = extract_json_array(text)?;
    serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))
}
