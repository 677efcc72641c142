use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single pantry item entered by the user. Always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredient(String);

impl Ingredient {
    /// Trims the input and returns `None` when nothing is left.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ingredient {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Lowercase and drop separators so "Gluten Free", "gluten-free" and "GlutenFree" all match.
fn normalize_choice(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DietaryPreference {
    #[default]
    None,
    Vegetarian,
    Vegan,
    #[serde(rename = "Gluten Free")]
    GlutenFree,
    Keto,
    Paleo,
}

impl DietaryPreference {
    pub const ALL: [DietaryPreference; 6] = [
        DietaryPreference::None,
        DietaryPreference::Vegetarian,
        DietaryPreference::Vegan,
        DietaryPreference::GlutenFree,
        DietaryPreference::Keto,
        DietaryPreference::Paleo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DietaryPreference::None => "None",
            DietaryPreference::Vegetarian => "Vegetarian",
            DietaryPreference::Vegan => "Vegan",
            DietaryPreference::GlutenFree => "Gluten Free",
            DietaryPreference::Keto => "Keto",
            DietaryPreference::Paleo => "Paleo",
        }
    }
}

impl fmt::Display for DietaryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DietaryPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_choice(s);
        Self::ALL
            .into_iter()
            .find(|pref| normalize_choice(pref.label()) == wanted)
            .ok_or_else(|| {
                let options: Vec<&str> = Self::ALL.iter().map(|p| p.label()).collect();
                format!(
                    "unknown dietary preference '{}' (expected one of: {})",
                    s.trim(),
                    options.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MealType {
    #[default]
    Any,
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl MealType {
    pub const ALL: [MealType; 6] = [
        MealType::Any,
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::Dessert,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Any => "Any",
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::Dessert => "Dessert",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_choice(s);
        Self::ALL
            .into_iter()
            .find(|meal| normalize_choice(meal.label()) == wanted)
            .ok_or_else(|| {
                let options: Vec<&str> = Self::ALL.iter().map(|m| m.label()).collect();
                format!(
                    "unknown meal type '{}' (expected one of: {})",
                    s.trim(),
                    options.join(", ")
                )
            })
    }
}

/// Per-serving nutrition estimate as returned by the model.
///
/// Macros are kept as the model wrote them ("20g", "12 g") and only turned
/// into numbers for display through [`NutritionalInfo::macro_grams`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protein: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub carbs: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fat: String,
}

impl NutritionalInfo {
    /// Carbs, protein and fat as whole grams, in display order.
    pub fn macro_grams(&self) -> [(&'static str, i64); 3] {
        [
            ("Carbs", leading_integer(&self.carbs)),
            ("Protein", leading_integer(&self.protein)),
            ("Fat", leading_integer(&self.fat)),
        ]
    }
}

// "20g" -> 20, "  7.5 g" -> 7, "-5g" -> -5, "n/a" -> 0
fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let magnitude: i64 = digits.parse().unwrap_or(0);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

// Absent and `null` optional fields both fall back to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One suggested dish. Text fields are kept exactly as the model returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub servings: i64,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub nutritional_info: NutritionalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tips: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_parse_trims_and_rejects_blank() {
        assert_eq!(Ingredient::parse("  rice ").unwrap().as_str(), "rice");
        assert!(Ingredient::parse("").is_none());
        assert!(Ingredient::parse("   \t ").is_none());
    }

    #[test]
    fn test_dietary_preference_parsing_is_lenient() {
        assert_eq!("gluten-free".parse::<DietaryPreference>(), Ok(DietaryPreference::GlutenFree));
        assert_eq!("Gluten Free".parse::<DietaryPreference>(), Ok(DietaryPreference::GlutenFree));
        assert_eq!("VEGAN".parse::<DietaryPreference>(), Ok(DietaryPreference::Vegan));
        let err = "carnivore".parse::<DietaryPreference>().unwrap_err();
        assert!(err.contains("carnivore"));
        assert!(err.contains("Paleo"));
    }

    #[test]
    fn test_meal_type_parsing_and_labels() {
        assert_eq!(" dessert ".parse::<MealType>(), Ok(MealType::Dessert));
        assert!("brunch".parse::<MealType>().is_err());
        for meal in MealType::ALL {
            assert_eq!(meal.label().parse::<MealType>(), Ok(meal));
        }
    }

    #[test]
    fn test_defaults_mean_no_restriction() {
        assert_eq!(DietaryPreference::default(), DietaryPreference::None);
        assert_eq!(MealType::default(), MealType::Any);
    }

    #[test]
    fn test_macro_grams_reads_leading_number() {
        let info = NutritionalInfo {
            calories: 450,
            protein: "32g".to_string(),
            carbs: " 7.5 g".to_string(),
            fat: "unknown".to_string(),
        };
        assert_eq!(info.macro_grams(), [("Carbs", 7), ("Protein", 32), ("Fat", 0)]);
    }

    #[test]
    fn test_macro_grams_keeps_leading_sign() {
        let info = NutritionalInfo {
            calories: 0,
            protein: "+3g".to_string(),
            carbs: "-5g".to_string(),
            fat: "-g".to_string(),
        };
        assert_eq!(info.macro_grams(), [("Carbs", -5), ("Protein", 3), ("Fat", 0)]);
    }

    #[test]
    fn test_recipe_optional_fields_default_when_missing() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "name": "Fried Rice",
                "description": "Quick and savory.",
                "prepTime": "10 mins",
                "cookTime": "15 mins",
                "ingredients": ["2 cups rice"],
                "instructions": ["Fry it."],
                "nutritionalInfo": {"calories": 400}
            }"#,
        )
        .unwrap();
        assert_eq!(recipe.servings, 0);
        assert_eq!(recipe.tips, "");
        assert!(recipe.tags.is_empty());
        assert_eq!(recipe.nutritional_info.protein, "");
    }

    #[test]
    fn test_recipe_optional_fields_default_when_null() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "name": "Fried Rice",
                "description": "Quick and savory.",
                "prepTime": "10 mins",
                "cookTime": "15 mins",
                "servings": null,
                "ingredients": ["2 cups rice"],
                "instructions": ["Fry it."],
                "nutritionalInfo": {"calories": null, "protein": null, "carbs": "40g", "fat": null},
                "tips": null,
                "tags": null
            }"#,
        )
        .unwrap();
        assert_eq!(recipe.servings, 0);
        assert_eq!(recipe.tips, "");
        assert!(recipe.tags.is_empty());
        assert_eq!(recipe.nutritional_info.calories, 0);
        assert_eq!(recipe.nutritional_info.protein, "");
        assert_eq!(recipe.nutritional_info.carbs, "40g");
    }
}
