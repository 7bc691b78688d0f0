use log::debug;
use thiserror::Error;

use crate::catalog::{self, DietaryRestriction};
use crate::model::GenerationRequest;

/// Bounds for the number of recipes a user may ask for
pub const MIN_RECIPE_COUNT: u8 = 1;
pub const MAX_RECIPE_COUNT: u8 = 5;

/// Outcome of one speech-to-text attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// A finished transcript
    Transcript(String),
    /// The platform has no speech recognition
    Unsupported,
    /// Recognition started but failed
    Failed(String),
}

/// Notices shown to the user instead of failing the capture
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureNotice {
    #[error("جهازك لا يدعم ميزة التعرف على الصوت.")]
    SpeechUnsupported,

    #[error("تعذر التعرف على الصوت: {0}")]
    SpeechFailed(String),
}

/// Ingredient and preference capture state
#[derive(Debug, Clone)]
pub struct IngredientCapture {
    draft: String,
    ingredients: Vec<String>,
    restrictions: Vec<DietaryRestriction>,
    recipe_count: u8,
}

impl Default for IngredientCapture {
    fn default() -> Self {
        Self::new(3)
    }
}

impl IngredientCapture {
    pub fn new(recipe_count: u8) -> Self {
        Self {
            draft: String::new(),
            ingredients: Vec::new(),
            restrictions: Vec::new(),
            recipe_count: recipe_count.clamp(MIN_RECIPE_COUNT, MAX_RECIPE_COUNT),
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn restrictions(&self) -> &[DietaryRestriction] {
        &self.restrictions
    }

    pub fn recipe_count(&self) -> u8 {
        self.recipe_count
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Move the draft into the ingredient list; the draft is kept when rejected
    pub fn commit_draft(&mut self) -> bool {
        let draft = std::mem::take(&mut self.draft);
        if self.add(&draft) {
            true
        } else {
            self.draft = draft;
            false
        }
    }

    /// Add one ingredient; blank and duplicate entries are ignored
    pub fn add(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        if ingredient.is_empty() || self.contains(ingredient) {
            return false;
        }
        self.ingredients.push(ingredient.to_string());
        true
    }

    /// Add an entry picked from the catalog
    pub fn pick(&mut self, item: &str) -> bool {
        catalog::contains(item) && self.add(item)
    }

    pub fn remove(&mut self, ingredient: &str) -> bool {
        let ingredient = ingredient.trim();
        let before = self.ingredients.len();
        self.ingredients.retain(|i| i != ingredient);
        self.ingredients.len() != before
    }

    pub fn contains(&self, ingredient: &str) -> bool {
        self.ingredients.iter().any(|i| i == ingredient)
    }

    /// Toggle a restriction, returning whether it is now selected
    pub fn toggle_restriction(&mut self, restriction: DietaryRestriction) -> bool {
        if let Some(pos) = self.restrictions.iter().position(|r| *r == restriction) {
            self.restrictions.remove(pos);
            false
        } else {
            self.restrictions.push(restriction);
            true
        }
    }

    pub fn set_recipe_count(&mut self, count: u8) -> u8 {
        self.recipe_count = count.clamp(MIN_RECIPE_COUNT, MAX_RECIPE_COUNT);
        self.recipe_count
    }

    /// Split a dictated transcript into ingredients and add the new ones
    pub fn apply_transcript(&mut self, transcript: &str) -> Vec<String> {
        let added: Vec<String> = split_transcript(transcript)
            .into_iter()
            .filter(|token| self.add(token))
            .collect();
        debug!("Transcript {:?} added {:?}", transcript, added);
        added
    }

    /// Apply the outcome of a speech capture attempt
    pub fn apply_utterance(&mut self, utterance: Utterance) -> Result<Vec<String>, CaptureNotice> {
        match utterance {
            Utterance::Transcript(text) => Ok(self.apply_transcript(&text)),
            Utterance::Unsupported => Err(CaptureNotice::SpeechUnsupported),
            Utterance::Failed(reason) => Err(CaptureNotice::SpeechFailed(reason)),
        }
    }

    /// Build a request from the current selection; `None` when no ingredients
    pub fn submission(&self) -> Option<GenerationRequest> {
        if self.ingredients.is_empty() {
            return None;
        }
        Some(GenerationRequest {
            ingredients: self.ingredients.clone(),
            dietary_restrictions: self
                .restrictions
                .iter()
                .map(|r| r.label().to_string())
                .collect(),
            recipe_count: self.recipe_count,
        })
    }

    /// Reset ingredients, restrictions and the draft
    pub fn clear(&mut self) {
        self.draft.clear();
        self.ingredients.clear();
        self.restrictions.clear();
    }
}

/// Split on the spoken conjunctions (" و ", " and ") and commas (Latin and Arabic)
pub fn split_transcript(transcript: &str) -> Vec<String> {
    let normalized = format!(" {} ", transcript)
        .replace(" و ", ",")
        .replace(" and ", ",")
        .replace('،', ",");
    normalized
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_suppresses_duplicates() {
        let mut capture = IngredientCapture::default();
        assert!(capture.add(" طماطم "));
        assert!(!capture.add("طماطم"));
        assert!(!capture.add("   "));
        assert!(capture.add("بصل"));
        assert_eq!(capture.ingredients(), &["طماطم", "بصل"]);
    }

    #[test]
    fn test_commit_draft() {
        let mut capture = IngredientCapture::default();
        capture.set_draft("أرز");
        assert!(capture.commit_draft());
        assert_eq!(capture.draft(), "");

        capture.set_draft("أرز");
        assert!(!capture.commit_draft());
        assert_eq!(capture.draft(), "أرز");
    }

    #[test]
    fn test_pick_only_accepts_catalog_items() {
        let mut capture = IngredientCapture::default();
        assert!(capture.pick("حمص"));
        assert!(!capture.pick("حمص"));
        assert!(!capture.pick("unicorn meat"));
        assert_eq!(capture.ingredients(), &["حمص"]);
    }

    #[test]
    fn test_remove() {
        let mut capture = IngredientCapture::default();
        capture.add("بيض");
        capture.add("حليب");
        assert!(capture.remove("بيض"));
        assert!(!capture.remove("بيض"));
        assert_eq!(capture.ingredients(), &["حليب"]);
    }

    #[test]
    fn test_toggle_restriction() {
        let mut capture = IngredientCapture::default();
        assert!(capture.toggle_restriction(DietaryRestriction::Vegan));
        assert!(capture.toggle_restriction(DietaryRestriction::LowCarb));
        assert!(!capture.toggle_restriction(DietaryRestriction::Vegan));
        assert_eq!(capture.restrictions(), &[DietaryRestriction::LowCarb]);
    }

    #[test]
    fn test_split_transcript_on_conjunctions() {
        assert_eq!(
            split_transcript("دجاج و أرز، طماطم"),
            vec!["دجاج", "أرز", "طماطم"]
        );
        assert_eq!(
            split_transcript("chicken and rice, tomatoes"),
            vec!["chicken", "rice", "tomatoes"]
        );
        // "and" inside a word is not a delimiter
        assert_eq!(split_transcript("candy"), vec!["candy"]);
    }

    #[test]
    fn test_transcript_only_appends_new_tokens() {
        let mut capture = IngredientCapture::default();
        capture.add("أرز");
        let added = capture.apply_transcript("أرز و عدس و عدس");
        assert_eq!(added, vec!["عدس"]);
        assert_eq!(capture.ingredients(), &["أرز", "عدس"]);
    }

    #[test]
    fn test_unsupported_speech_is_a_notice() {
        let mut capture = IngredientCapture::default();
        let result = capture.apply_utterance(Utterance::Unsupported);
        assert_eq!(result, Err(CaptureNotice::SpeechUnsupported));
        assert!(capture.ingredients().is_empty());

        let result = capture.apply_utterance(Utterance::Failed("no-speech".to_string()));
        assert!(matches!(result, Err(CaptureNotice::SpeechFailed(_))));
    }

    #[test]
    fn test_submission_requires_ingredients() {
        let mut capture = IngredientCapture::default();
        capture.toggle_restriction(DietaryRestriction::Vegetarian);
        assert!(capture.submission().is_none());

        capture.add("كوسة");
        let request = capture.submission().unwrap();
        assert_eq!(request.ingredients, vec!["كوسة"]);
        assert_eq!(request.dietary_restrictions, vec!["نباتي"]);
        assert_eq!(request.recipe_count, 3);
    }

    #[test]
    fn test_recipe_count_is_clamped() {
        let mut capture = IngredientCapture::new(9);
        assert_eq!(capture.recipe_count(), MAX_RECIPE_COUNT);
        assert_eq!(capture.set_recipe_count(0), MIN_RECIPE_COUNT);
        assert_eq!(capture.set_recipe_count(4), 4);
    }

    #[test]
    fn test_clear_resets_everything_but_count() {
        let mut capture = IngredientCapture::new(4);
        capture.add("جزر");
        capture.set_draft("خيار");
        capture.toggle_restriction(DietaryRestriction::DairyFree);
        capture.clear();
        assert!(capture.ingredients().is_empty());
        assert!(capture.restrictions().is_empty());
        assert_eq!(capture.draft(), "");
        assert_eq!(capture.recipe_count(), 4);
    }
}
