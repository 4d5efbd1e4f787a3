use serde::{Deserialize, Serialize};

/// A single corpus record with every optional field resolved at load time.
///
/// Only built through the validated load path, so it is serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub cuisine: String,
    pub calories: f64,
    pub prep_time: f64,
}

/// The fields returned to callers for every recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub name: String,
    pub cuisine: String,
    pub calories: f64,
    pub prep_time: f64,
}

impl Recipe {
    pub fn new(name: impl Into<String>, ingredients: &[&str]) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients
                .iter()
                .map(|i| normalize_ingredient(i))
                .filter(|i| !i.is_empty())
                .collect(),
            cuisine: String::new(),
            calories: 0.0,
            prep_time: 0.0,
        }
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = cuisine.into();
        self
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories = calories;
        self
    }

    pub fn with_prep_time(mut self, prep_time: f64) -> Self {
        self.prep_time = prep_time;
        self
    }

    /// Space-joined ingredients, the document the lexical model is fitted on.
    pub fn ingredient_text(&self) -> String {
        self.ingredients.join(" ")
    }

    /// `name ingredients cuisine`, the text embedded by the semantic index.
    pub fn canonical_text(&self) -> String {
        format!("{} {} {}", self.name, self.ingredient_text(), self.cuisine)
    }

    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            name: self.name.clone(),
            cuisine: self.cuisine.clone(),
            calories: self.calories,
            prep_time: self.prep_time,
        }
    }
}

/// Normalize ingredient name (trim, lowercase, collapse inner whitespace)
pub fn normalize_ingredient(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Loosely-typed record as it appears in the dataset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecipe {
    name: Option<String>,
    ingredients: Option<RawIngredients>,
    cuisine: Option<String>,
    calories: Option<f64>,
    #[serde(alias = "prep_time")]
    prep_time: Option<f64>,
}

/// Ingredients are a list in the curated dataset and a comma-separated
/// string in the CSV-derived one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIngredients {
    List(Vec<String>),
    Text(String),
}

impl RawIngredients {
    fn into_normalized(self) -> Vec<String> {
        let items = match self {
            RawIngredients::List(items) => items,
            RawIngredients::Text(text) => text.split(',').map(str::to_string).collect(),
        };

        items
            .iter()
            .map(|i| normalize_ingredient(i))
            .filter(|i| !i.is_empty())
            .collect()
    }
}

/// Validate one dataset record. The error is the reason it was rejected.
pub(crate) fn parse_record(value: serde_json::Value) -> std::result::Result<Recipe, String> {
    if !value.is_object() {
        return Err("record is not an object".to_string());
    }

    let raw: RawRecipe = serde_json::from_value(value).map_err(|e| e.to_string())?;

    let name = raw
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| "missing or empty name".to_string())?;

    let ingredients = raw
        .ingredients
        .map(RawIngredients::into_normalized)
        .filter(|i| !i.is_empty())
        .ok_or_else(|| format!("recipe '{name}' has no ingredients"))?;

    let calories = non_negative(raw.calories, "calories", &name)?;
    let prep_time = non_negative(raw.prep_time, "prepTime", &name)?;

    Ok(Recipe {
        name,
        ingredients,
        cuisine: raw.cuisine.map(|c| c.trim().to_string()).unwrap_or_default(),
        calories,
        prep_time,
    })
}

fn non_negative(value: Option<f64>, field: &str, name: &str) -> std::result::Result<f64, String> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(format!("recipe '{name}' has invalid {field}: {v}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_record_defaults() {
        let recipe = parse_record(json!({
            "name": "Plain Rice",
            "ingredients": ["Rice", "  Salt "]
        }))
        .unwrap();

        assert_eq!(recipe.ingredients, vec!["rice", "salt"]);
        assert_eq!(recipe.cuisine, "");
        assert_eq!(recipe.calories, 0.0);
        assert_eq!(recipe.prep_time, 0.0);
    }

    #[test]
    fn test_parse_record_optional_fields() {
        let recipe = parse_record(json!({
            "name": "Paneer Tikka",
            "ingredients": ["paneer", "masala"],
            "cuisine": "Indian",
            "calories": 320,
            "prepTime": 25
        }))
        .unwrap();

        assert_eq!(recipe.cuisine, "Indian");
        assert_eq!(recipe.calories, 320.0);
        assert_eq!(recipe.prep_time, 25.0);

        let recipe = parse_record(json!({
            "name": "Aloo",
            "ingredients": ["potato"],
            "prep_time": 15
        }))
        .unwrap();
        assert_eq!(recipe.prep_time, 15.0);
    }

    #[test]
    fn test_parse_record_ingredient_text() {
        let recipe = parse_record(json!({
            "name": "Masala Omelette",
            "ingredients": "Egg, onion,  green chilli ,"
        }))
        .unwrap();

        assert_eq!(recipe.ingredients, vec!["egg", "onion", "green chilli"]);
    }

    #[test]
    fn test_parse_record_rejects_malformed() {
        assert!(parse_record(json!("just a string")).is_err());
        assert!(parse_record(json!({"ingredients": ["egg"]})).is_err());
        assert!(parse_record(json!({"name": "  ", "ingredients": ["egg"]})).is_err());
        assert!(parse_record(json!({"name": "Nothing", "ingredients": []})).is_err());
        assert!(parse_record(json!({"name": "Nothing", "ingredients": [" "]})).is_err());
        assert!(parse_record(json!({"name": "Bad", "ingredients": ["egg"], "calories": -5})).is_err());
        assert!(parse_record(json!({"name": "Bad", "ingredients": ["egg"], "calories": "lots"})).is_err());
    }

    #[test]
    fn test_canonical_text() {
        let recipe = Recipe::new("Veg Fried Rice", &["rice", "onion"]).with_cuisine("Chinese");
        assert_eq!(recipe.ingredient_text(), "rice onion");
        assert_eq!(recipe.canonical_text(), "Veg Fried Rice rice onion Chinese");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = Recipe::new("Toast", &["bread"]).with_prep_time(5.0).summary();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["prepTime"], 5.0);
        assert!(value.get("ingredients").is_none());
    }

    #[test]
    fn test_serialized_recipe_reloads_only_through_validation() {
        let recipe = Recipe::new("Toast", &["Bread", "butter"]).with_calories(180.0);
        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(parse_record(value).unwrap(), recipe);

        let invalid = serde_json::to_value(Recipe::new("Toast", &["bread"]).with_calories(-1.0)).unwrap();
        assert!(parse_record(invalid).is_err());
    }
}
