use crate::model::Recipe;

/// Template for the recipe batch prompt.
///
/// Loaded from `prompts/recipes.txt` at compile time. Contains `{{COUNT}}`,
/// `{{INGREDIENTS}}` and `{{RESTRICTIONS}}` placeholders filled in by
/// [`recipes_prompt`].
pub const RECIPES_PROMPT: &str = include_str!("prompts/recipes.txt");

/// Template for the variation suggestions prompt, with `{{TITLE}}` and
/// `{{INGREDIENTS}}` placeholders.
pub const VARIATIONS_PROMPT: &str = include_str!("prompts/variations.txt");

/// Build the prompt asking for `count` recipes from the given pantry
pub fn recipes_prompt(ingredients: &[String], restrictions: &[String], count: u8) -> String {
    let restrictions_line = if restrictions.is_empty() {
        String::new()
    } else {
        format!(
            "يجب أن تلتزم جميع الوصفات بصرامة بالقيود الغذائية التالية: {}.",
            restrictions.join("، ")
        )
    };

    RECIPES_PROMPT
        .replace("{{COUNT}}", &count.to_string())
        .replace("{{INGREDIENTS}}", &ingredients.join(", "))
        .replace("{{RESTRICTIONS}}", &restrictions_line)
}

/// Build the prompt asking for variations of `recipe`
pub fn variations_prompt(recipe: &Recipe) -> String {
    VARIATIONS_PROMPT
        .replace("{{TITLE}}", &recipe.title)
        .replace("{{INGREDIENTS}}", &recipe.ingredients.join("، "))
}

/// Short photographic prompt for a dish photo
pub fn image_prompt(title: &str) -> String {
    format!(
        "صورة فوتوغرافية احترافية وواقعية لطبق: {}. يجب أن يبدو الطبق شهياً وبجودة عالية، على خلفية بسيطة ونظيفة.",
        title
    )
}
