//! Terminal rendering of recipe cards, the progress indicator, errors and the
//! credential notice.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

use crate::model::{NutritionField, Recipe};
use crate::orchestrator::{AppState, ImageStatus, ProgressStep, VariationStatus};

const BAR_WIDTH: usize = 20;

impl NutritionField {
    pub fn label(&self) -> &'static str {
        match self {
            NutritionField::Calories => "السعرات",
            NutritionField::Protein => "البروتين",
            NutritionField::Carbs => "الكربوهيدرات",
            NutritionField::Fat => "الدهون",
        }
    }
}

/// One recipe with its image and variation state, ready for display
#[derive(Debug, Clone, Copy)]
pub struct RecipeCard<'a> {
    pub index: usize,
    pub recipe: &'a Recipe,
    pub image: ImageStatus<'a>,
    pub variations: VariationStatus<'a>,
}

/// Cards for every recipe of the current batch, numbered from 1
pub fn cards(state: &AppState) -> Vec<RecipeCard<'_>> {
    state
        .recipes()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, recipe)| RecipeCard {
            index: i + 1,
            recipe,
            image: state.image_status(&recipe.title),
            variations: state.variation_status(&recipe.title),
        })
        .collect()
}

impl fmt::Display for RecipeCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recipe = self.recipe;
        writeln!(f, "[{}] {}", self.index, recipe.title)?;

        match self.image {
            ImageStatus::Pending => writeln!(f, "    🖼  جاري تحضير الصورة...")?,
            ImageStatus::Failed => writeln!(f, "    🖼  تعذر إنشاء صورة الطبق")?,
            ImageStatus::Ready(uri) => writeln!(f, "    🖼  {}", describe_image(uri))?,
        }

        if !recipe.description.trim().is_empty() {
            writeln!(f, "    {}", recipe.description)?;
        }

        let mut facts = vec![
            format!("وقت التحضير: {}", recipe.prep_time),
            format!("تكفي لـ: {}", recipe.servings),
        ];
        facts.extend(
            recipe
                .nutrition()
                .into_iter()
                .map(|(field, value)| format!("{}: {}", field.label(), value)),
        );
        writeln!(f, "    {}", facts.join(" | "))?;

        writeln!(f, "    المكونات:")?;
        for ingredient in &recipe.ingredients {
            writeln!(f, "      • {}", ingredient)?;
        }

        writeln!(f, "    طريقة التحضير:")?;
        for (i, step) in recipe.instructions.iter().enumerate() {
            writeln!(f, "      {}. {}", i + 1, step)?;
        }

        write!(f, "    تنويعات مقترحة: ")?;
        match self.variations {
            VariationStatus::NotRequested => {
                writeln!(f, "اكتب \"vary {}\" لاقتراح تنويعات!", self.index)
            }
            VariationStatus::Loading => writeln!(f, "جاري البحث عن أفكار إبداعية..."),
            VariationStatus::Ready(text) => {
                writeln!(f)?;
                for line in text.lines() {
                    writeln!(f, "      {}", line)?;
                }
                Ok(())
            }
        }
    }
}

/// Short description of a `data:` URI instead of dumping the payload
pub fn describe_image(uri: &str) -> String {
    match decode_data_uri(uri) {
        Some((mime, bytes)) => format!("صورة جاهزة ({}, {} KB)", mime, bytes.len().div_ceil(1024)),
        None => "صورة جاهزة".to_string(),
    }
}

/// Decode a base64 `data:` URI into its mime type and bytes
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(data.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// File extension for an image mime type
pub fn image_extension(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// File-name friendly form of a title; letters of any script are kept
pub fn slug(title: &str) -> String {
    let mut slug = String::new();
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "recipe".to_string()
    } else {
        slug
    }
}

/// Progress indicator: label and a bar proportional to the step
pub fn render_progress(step: ProgressStep) -> String {
    let total = ProgressStep::ALL.len();
    let done = step.index() + 1;
    let percent = done * 100 / total;
    let filled = BAR_WIDTH * done / total;
    format!(
        "{}\n[{}{}] {}%",
        step.label(),
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

pub fn render_error(message: &str) -> String {
    format!("خطأ! {}", message)
}

/// Notice shown while the credential gate is closed
pub fn render_credential_notice() -> String {
    [
        "مطلوب مفتاح API",
        "يعتمد هذا التطبيق على واجهة Gemini. للمتابعة، اضبط GEMINI_API_KEY أو اكتب: key <المفتاح>",
        "قد يتم تطبيق رسوم حسب الاستخدام: https://ai.google.dev/gemini-api/docs/billing",
    ]
    .join("\n")
}

/// Everything currently visible: loader, error and cards
pub fn render_state(state: &AppState) -> String {
    let mut sections = Vec::new();
    if state.is_loading() {
        sections.push(render_progress(state.progress()));
    }
    if let Some(error) = state.error() {
        sections.push(render_error(error));
    }
    sections.extend(cards(state).iter().map(ToString::to_string));
    sections.join("\n")
}
