use serde_json::{json, Value};

/// Fields the model must always return for a recipe
pub const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "description",
    "ingredients",
    "instructions",
    "servings",
    "prepTime",
];

/// Response schema declared with the recipe request (Gemini `responseSchema` format)
pub fn recipe_list_schema() -> Value {
    let text = |description: &str| json!({ "type": "STRING", "description": description });
    let list = |description: &str| {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": description
        })
    };

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": text("عنوان الوصفة باللغة العربية"),
                "description": text("وصف قصير للوصفة باللغة العربية"),
                "ingredients": list("قائمة المكونات المطلوبة للوصفة باللغة العربية"),
                "instructions": list("خطوات التحضير بالتفصيل باللغة العربية"),
                "servings": text("عدد الأفراد الذين تكفيهم الوصفة"),
                "prepTime": text("الوقت اللازم للتحضير"),
                "calories": text("تقدير السعرات الحرارية الإجمالية للطبق"),
                "protein": text("تقدير كمية البروتين بالجرام"),
                "carbs": text("تقدير كمية الكربوهيدرات بالجرام"),
                "fat": text("تقدير كمية الدهون بالجرام"),
            },
            "required": REQUIRED_FIELDS,
        }
    })
}
