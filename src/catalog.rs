//! Static catalogs offered to the user: dietary restrictions and a browsable
//! ingredient list grouped by category.

/// Dietary restrictions the user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    LowCarb,
}

impl DietaryRestriction {
    pub const ALL: [DietaryRestriction; 5] = [
        DietaryRestriction::Vegetarian,
        DietaryRestriction::Vegan,
        DietaryRestriction::GlutenFree,
        DietaryRestriction::DairyFree,
        DietaryRestriction::LowCarb,
    ];

    /// Stable identifier used on the command line
    pub fn id(&self) -> &'static str {
        match self {
            DietaryRestriction::Vegetarian => "vegetarian",
            DietaryRestriction::Vegan => "vegan",
            DietaryRestriction::GlutenFree => "gluten-free",
            DietaryRestriction::DairyFree => "dairy-free",
            DietaryRestriction::LowCarb => "low-carb",
        }
    }

    /// Localized label, sent verbatim in the recipe prompt
    pub fn label(&self) -> &'static str {
        match self {
            DietaryRestriction::Vegetarian => "نباتي",
            DietaryRestriction::Vegan => "نباتي صرف (فيجن)",
            DietaryRestriction::GlutenFree => "خالي من الغلوتين",
            DietaryRestriction::DairyFree => "خالي من الألبان",
            DietaryRestriction::LowCarb => "قليل الكربوهيدرات",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        Self::ALL.into_iter().find(|r| r.id() == id)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|r| r.label() == label)
    }

    /// Accepts either the identifier or the localized label
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_id(value).or_else(|| Self::from_label(value))
    }
}

/// Ingredient catalog grouped by category
pub const INGREDIENT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "خضروات",
        &[
            "طماطم", "بصل", "ثوم", "بطاطس", "جزر", "فلفل حلو", "خيار", "باذنجان", "كوسة", "سبانخ",
            "بروكلي", "فطر", "خس", "ذرة",
        ],
    ),
    (
        "فواكه",
        &["ليمون", "تفاح", "موز", "برتقال", "أفوكادو", "مانجو", "زيتون", "تمر"],
    ),
    (
        "لحوم ودواجن",
        &[
            "صدر دجاج",
            "لحم بقري مفروم",
            "فخذ دجاج",
            "ستيك لحم",
            "نقانق",
            "دجاج كامل",
            "لحم غنم",
        ],
    ),
    (
        "أسماك ومأكولات بحرية",
        &["سمك فيليه", "جمبري", "سلمون", "تونة معلبة"],
    ),
    (
        "بقوليات وحبوب",
        &[
            "أرز", "عدس", "حمص", "فاصوليا", "معكرونة", "برغل", "كينوا", "شوفان", "خبز",
        ],
    ),
    (
        "منتجات الألبان والبيض",
        &[
            "بيض",
            "حليب",
            "جبن شيدر",
            "جبن موزاريلا",
            "زبادي",
            "زبدة",
            "قشطة",
            "لبنة",
        ],
    ),
    (
        "بهارات وتوابل",
        &[
            "ملح",
            "فلفل أسود",
            "كمون",
            "كزبرة",
            "كركم",
            "بابريكا",
            "قرفة",
            "زعتر",
            "ورق غار",
            "فلفل حار",
            "زنجبيل",
            "هيل",
        ],
    ),
    (
        "معلبات وصلصات",
        &[
            "معجون طماطم",
            "كاتشب",
            "مايونيز",
            "خردل",
            "صلصة الصويا",
            "مرقة دجاج",
            "خل",
        ],
    ),
    (
        "مكسرات وزيوت",
        &["زيت زيتون", "زيت نباتي", "لوز", "جوز", "طحينة", "سمسم"],
    ),
];

/// Filter the catalog by a case-insensitive substring, dropping empty categories
pub fn search(term: &str) -> Vec<(&'static str, Vec<&'static str>)> {
    let needle = term.trim().to_lowercase();
    INGREDIENT_CATEGORIES
        .iter()
        .map(|(category, items)| {
            let matches = items
                .iter()
                .copied()
                .filter(|item| item.to_lowercase().contains(&needle))
                .collect::<Vec<_>>();
            (*category, matches)
        })
        .filter(|(_, items)| !items.is_empty())
        .collect()
}

/// Whether `item` is an entry of the catalog
pub fn contains(item: &str) -> bool {
    let item = item.trim();
    INGREDIENT_CATEGORIES
        .iter()
        .any(|(_, items)| items.contains(&item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restriction_lookup_by_id_and_label() {
        assert_eq!(
            DietaryRestriction::from_id("Gluten-Free"),
            Some(DietaryRestriction::GlutenFree)
        );
        assert_eq!(
            DietaryRestriction::from_label("نباتي"),
            Some(DietaryRestriction::Vegetarian)
        );
        assert_eq!(
            DietaryRestriction::parse("low-carb"),
            Some(DietaryRestriction::LowCarb)
        );
        assert_eq!(DietaryRestriction::parse("keto"), None);
    }

    #[test]
    fn test_restriction_ids_and_labels_are_unique() {
        for (i, a) in DietaryRestriction::ALL.iter().enumerate() {
            for b in DietaryRestriction::ALL.iter().skip(i + 1) {
                assert_ne!(a.id(), b.id());
                assert_ne!(a.label(), b.label());
            }
        }
    }

    #[test]
    fn test_empty_search_returns_whole_catalog() {
        let all = search("");
        assert_eq!(all.len(), INGREDIENT_CATEGORIES.len());
    }

    #[test]
    fn test_search_filters_items_and_drops_empty_categories() {
        let results = search("دجاج");
        assert!(!results.is_empty());
        for (_, items) in &results {
            assert!(items.iter().all(|item| item.contains("دجاج")));
        }
        let categories: Vec<_> = results.iter().map(|(c, _)| *c).collect();
        assert!(categories.contains(&"لحوم ودواجن"));
        assert!(categories.contains(&"معلبات وصلصات"));
        assert!(!categories.contains(&"فواكه"));
    }

    #[test]
    fn test_search_without_matches() {
        assert!(search("pineapple").is_empty());
    }

    #[test]
    fn test_contains() {
        assert!(contains("طحينة"));
        assert!(contains(" أرز "));
        assert!(!contains("كافيار"));
    }
}
