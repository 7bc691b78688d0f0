use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A generated recipe as returned by the text model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub servings: String,
    #[serde(deserialize_with = "string_or_number")]
    pub prep_time: String,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub calories: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub protein: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub carbs: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub fat: Option<String>,
}

impl Recipe {
    /// Nutrition estimates that are present and non-empty, in display order
    pub fn nutrition(&self) -> Vec<(NutritionField, &str)> {
        [
            (NutritionField::Calories, &self.calories),
            (NutritionField::Protein, &self.protein),
            (NutritionField::Carbs, &self.carbs),
            (NutritionField::Fat, &self.fat),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionField {
    Calories,
    Protein,
    Carbs,
    Fat,
}

/// One user submission: what is in the pantry and what must be respected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ingredients: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub recipe_count: u8,
}

// The schema asks for strings, but models sometimes answer `"servings": 4`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
