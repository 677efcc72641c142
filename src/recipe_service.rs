//! Turns a [`SearchState`] into recipe suggestions from the generative model.
//!
//! One call per generation, no retries, no caching. The model is asked for a
//! JSON array constrained by [`recipe_response_schema`]; whatever comes back is
//! validated as a whole, so callers either get every recipe or an error.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::api_connection::connection::{ApiConnectionError, ModelBackend};
use crate::api_connection::endpoints::{
    Content, GenerateContentRequest, GenerationConfig, JsonSchema, SchemaType,
};
use crate::config::Config;
use crate::search_state::SearchState;
use crate::types::{DietaryPreference, Ingredient, MealType, Recipe};

pub const RECIPES_PER_REQUEST: usize = 3;

const REQUIRED_RECIPE_FIELDS: [&str; 7] = [
    "name",
    "description",
    "prepTime",
    "cookTime",
    "ingredients",
    "instructions",
    "nutritionalInfo",
];

/// Why a model payload could not be turned into recipes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{reason}", location(.index))]
pub struct ValidationError {
    /// Position of the offending recipe, when the problem is inside one.
    pub index: Option<usize>,
    pub reason: String,
}

impl ValidationError {
    fn payload(reason: impl Into<String>) -> Self {
        Self {
            index: None,
            reason: reason.into(),
        }
    }

    fn at(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            reason: reason.into(),
        }
    }
}

fn location(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("recipe #{}: ", index + 1),
        None => String::new(),
    }
}

/// Outcome of validating a model payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeParse {
    Recipes(Vec<Recipe>),
    Invalid(ValidationError),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model request failed: {0}")]
    Transport(#[from] ApiConnectionError),

    #[error("model returned an invalid recipe payload: {0}")]
    InvalidResponse(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Builds the natural-language instruction sent to the model.
///
/// The dietary and meal-type sentences only appear when a restriction is set.
pub fn build_prompt(
    ingredients: &[Ingredient],
    dietary: DietaryPreference,
    meal_type: MealType,
) -> String {
    let joined = ingredients
        .iter()
        .map(Ingredient::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![format!(
        "Create {} distinct, creative, and practical recipes using these ingredients: {}.",
        RECIPES_PER_REQUEST, joined
    )];
    if dietary != DietaryPreference::None {
        lines.push(format!("Dietary restriction: {}.", dietary));
    }
    if meal_type != MealType::Any {
        lines.push(format!("Meal type: {}.", meal_type));
    }
    lines.push(
        "You may assume the user has basic pantry staples (oil, salt, pepper, water, basic spices)."
            .to_string(),
    );
    lines.push(
        "For each recipe, provide detailed steps, estimated times, serving suggestions, and nutritional estimates."
            .to_string(),
    );
    lines.join("\n")
}

/// Structured-output schema: an array of recipe objects.
pub fn recipe_response_schema() -> JsonSchema {
    let string = || JsonSchema::of(SchemaType::String);
    let string_list = || JsonSchema::array_of(string());

    let mut nutrition = HashMap::new();
    nutrition.insert("calories".to_string(), JsonSchema::of(SchemaType::Integer));
    nutrition.insert("protein".to_string(), string());
    nutrition.insert("carbs".to_string(), string());
    nutrition.insert("fat".to_string(), string());

    let mut recipe = HashMap::new();
    recipe.insert("name".to_string(), string().described("Name of the dish"));
    recipe.insert(
        "description".to_string(),
        string().described("A short, appetizing description"),
    );
    recipe.insert(
        "prepTime".to_string(),
        string().described("Preparation time (e.g., '15 mins')"),
    );
    recipe.insert(
        "cookTime".to_string(),
        string().described("Cooking time (e.g., '30 mins')"),
    );
    recipe.insert(
        "servings".to_string(),
        JsonSchema::of(SchemaType::Integer).described("Number of servings"),
    );
    recipe.insert(
        "ingredients".to_string(),
        string_list().described("List of ingredients with quantities"),
    );
    recipe.insert(
        "instructions".to_string(),
        string_list().described("Step-by-step cooking instructions"),
    );
    recipe.insert(
        "nutritionalInfo".to_string(),
        JsonSchema::object(nutrition, &[]),
    );
    recipe.insert(
        "tips".to_string(),
        string().described("Chef's tips for presentation or variations"),
    );
    recipe.insert(
        "tags".to_string(),
        string_list().described("Tags like 'Spicy', 'Quick', 'Comfort Food'"),
    );

    JsonSchema::array_of(JsonSchema::object(recipe, &REQUIRED_RECIPE_FIELDS))
}

pub fn build_request(state: &SearchState) -> GenerateContentRequest {
    let prompt = build_prompt(state.ingredients(), state.dietary, state.meal_type);
    GenerateContentRequest {
        contents: vec![Content::user_text(prompt)],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(recipe_response_schema()),
        }),
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.ends_with("```") {
        return trimmed;
    }
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.trim_end_matches("```").trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validates a model payload against the recipe schema.
///
/// `None`, empty and whitespace-only payloads mean the model produced nothing
/// and yield an empty list. Any structural problem invalidates the whole batch.
pub fn parse_recipes(payload: Option<&str>) -> RecipeParse {
    let Some(raw) = payload else {
        return RecipeParse::Recipes(Vec::new());
    };
    let content = strip_code_fences(raw);
    if content.is_empty() {
        return RecipeParse::Recipes(Vec::new());
    }

    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            return RecipeParse::Invalid(ValidationError::payload(format!(
                "payload is not valid JSON: {}",
                e
            )))
        }
    };
    let items = match value {
        Value::Array(items) => items,
        other => {
            return RecipeParse::Invalid(ValidationError::payload(format!(
                "expected a JSON array of recipes, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut recipes = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Some(object) = item.as_object() else {
            return RecipeParse::Invalid(ValidationError::at(
                index,
                format!("expected an object, got {}", json_kind(&item)),
            ));
        };
        if let Some(missing) = REQUIRED_RECIPE_FIELDS
            .iter()
            .find(|field| object.get(**field).map_or(true, Value::is_null))
        {
            return RecipeParse::Invalid(ValidationError::at(
                index,
                format!("missing required field '{}'", missing),
            ));
        }
        match serde_json::from_value::<Recipe>(item) {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => return RecipeParse::Invalid(ValidationError::at(index, e.to_string())),
        }
    }
    RecipeParse::Recipes(recipes)
}

/// Asks the model for recipes. Owns its configuration; reads nothing global.
pub struct RecipeService<B> {
    config: Config,
    backend: B,
}

impl<B: ModelBackend> RecipeService<B> {
    pub fn new(config: Config, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn generate_recipes(&self, state: &SearchState) -> Result<Vec<Recipe>, RecipeError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            RecipeError::Configuration(
                "API key is missing. Set GEMINI_API_KEY (or API_KEY) in the environment or a .env file."
                    .to_string(),
            )
        })?;

        let request = build_request(state);
        tracing::info!(
            model = self.backend.model_name(),
            ingredients = state.ingredients().len(),
            dietary = %state.dietary,
            meal_type = %state.meal_type,
            "requesting recipes"
        );

        let response = self
            .backend
            .generate_content(api_key, &request)
            .await
            .map_err(GenerationError::from)?;

        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "token usage"
            );
        }

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(block_reason = reason, "model blocked the prompt");
        }

        let payload = response.text();
        tracing::debug!(payload = payload.as_deref().unwrap_or(""), "raw model payload");

        match parse_recipes(payload.as_deref()) {
            RecipeParse::Recipes(recipes) => {
                tracing::info!(count = recipes.len(), "recipes generated");
                Ok(recipes)
            }
            RecipeParse::Invalid(err) => Err(GenerationError::from(err).into()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn state_with(ingredients: &[&str]) -> SearchState {
        let mut state = SearchState::new();
        for i in ingredients {
            state.add_ingredient(i);
        }
        state
    }

    #[test]
    fn test_prompt_without_filters_has_no_clauses() {
        let state = state_with(&["chicken", "rice"]);
        let prompt = build_prompt(state.ingredients(), state.dietary, state.meal_type);
        assert!(prompt.contains("chicken, rice"));
        assert!(prompt.contains("Create 3 distinct"));
        assert!(!prompt.contains("Dietary restriction"));
        assert!(!prompt.contains("Meal type"));
    }

    #[test]
    fn test_prompt_includes_filter_clauses_when_set() {
        let state = state_with(&["tofu"]);
        let prompt = build_prompt(
            state.ingredients(),
            DietaryPreference::GlutenFree,
            MealType::Breakfast,
        );
        assert!(prompt.contains("Dietary restriction: Gluten Free."));
        assert!(prompt.contains("Meal type: Breakfast."));

        let vegan = build_prompt(state.ingredients(), DietaryPreference::Vegan, MealType::Any);
        assert!(vegan.contains("Vegan"));
        assert!(!vegan.contains("Meal type"));
    }

    #[test]
    fn test_schema_requires_core_fields_only() {
        let schema = serde_json::to_value(recipe_response_schema()).unwrap();
        assert_eq!(schema["type"], "ARRAY");
        let item = &schema["items"];
        assert_eq!(item["type"], "OBJECT");
        assert_eq!(
            item["required"],
            json!(["name", "description", "prepTime", "cookTime", "ingredients", "instructions", "nutritionalInfo"])
        );
        assert_eq!(item["properties"]["servings"]["type"], "INTEGER");
        assert_eq!(item["properties"]["tags"]["items"]["type"], "STRING");
        assert_eq!(item["properties"]["nutritionalInfo"]["properties"]["calories"]["type"], "INTEGER");
    }

    #[test]
    fn test_request_asks_for_json() {
        let request = build_request(&state_with(&["egg"]));
        let config = request.generation_config.unwrap();
        assert_eq!(config.response_mime_type.as_deref(), Some("application/json"));
        assert!(config.response_schema.is_some());
        let text = request.contents[0].parts[0].text.as_deref().unwrap();
        assert!(text.contains("egg"));
    }

    #[test]
    fn test_parse_copies_fields_verbatim() {
        let payload = json!([recipe_json("Garlic Rice"), recipe_json("  Spacey  "), recipe_json("Bowl")]);
        let RecipeParse::Recipes(recipes) = parse_recipes(Some(&payload.to_string())) else {
            panic!("expected recipes");
        };
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[1].name, "  Spacey  ");
        assert_eq!(recipes[0].nutritional_info.protein, "35g");
        assert_eq!(recipes[0].instructions.len(), 3);
        assert_eq!(recipes[2].tags[3], "Weeknight");
    }

    #[test]
    fn test_parse_empty_payloads_yield_no_recipes() {
        assert_eq!(parse_recipes(None), RecipeParse::Recipes(vec![]));
        assert_eq!(parse_recipes(Some("")), RecipeParse::Recipes(vec![]));
        assert_eq!(parse_recipes(Some("  \n")), RecipeParse::Recipes(vec![]));
        assert_eq!(parse_recipes(Some("[]")), RecipeParse::Recipes(vec![]));
    }

    #[test]
    fn test_parse_strips_markdown_fences() {
        let payload = format!("```json\n{}\n```", json!([recipe_json("Fenced")]));
        let RecipeParse::Recipes(recipes) = parse_recipes(Some(&payload)) else {
            panic!("expected recipes");
        };
        assert_eq!(recipes[0].name, "Fenced");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let RecipeParse::Invalid(err) = parse_recipes(Some(r#"{"name": "x"}"#)) else {
            panic!("expected invalid");
        };
        assert_eq!(err.index, None);
        assert!(err.reason.contains("expected a JSON array"));
    }

    #[test]
    fn test_parse_rejects_garbage_text() {
        let RecipeParse::Invalid(err) = parse_recipes(Some("Sure! Here are three recipes")) else {
            panic!("expected invalid");
        };
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_parse_is_all_or_nothing() {
        let mut broken = recipe_json("Broken");
        broken.as_object_mut().unwrap().remove("instructions");
        let payload = json!([recipe_json("Fine"), broken]);
        let RecipeParse::Invalid(err) = parse_recipes(Some(&payload.to_string())) else {
            panic!("expected invalid");
        };
        assert_eq!(err.index, Some(1));
        assert_eq!(err.to_string(), "recipe #2: missing required field 'instructions'");
    }

    #[test]
    fn test_parse_rejects_wrong_field_type() {
        let mut wrong = recipe_json("Wrong");
        wrong["servings"] = json!("four");
        let RecipeParse::Invalid(err) = parse_recipes(Some(&json!([wrong]).to_string())) else {
            panic!("expected invalid");
        };
        assert_eq!(err.index, Some(0));
    }

    #[test]
    fn test_parse_treats_null_optional_fields_as_missing() {
        let cases = [
            ("/tips", json!(null)),
            ("/tags", json!(null)),
            ("/servings", json!(null)),
            ("/nutritionalInfo/protein", json!(null)),
            ("/nutritionalInfo/calories", json!(null)),
        ];
        for (pointer, value) in cases {
            let mut recipe = recipe_json("Sparse");
            *recipe.pointer_mut(pointer).unwrap() = value;
            match parse_recipes(Some(&json!([recipe_json("Full"), recipe]).to_string())) {
                RecipeParse::Recipes(recipes) => assert_eq!(recipes.len(), 2),
                RecipeParse::Invalid(err) => panic!("{} = null invalidated the batch: {}", pointer, err),
            }
        }

        let mut sparse = recipe_json("Sparse");
        for field in ["tips", "tags", "servings"] {
            sparse[field] = Value::Null;
        }
        sparse["nutritionalInfo"]["protein"] = Value::Null;
        let RecipeParse::Recipes(recipes) = parse_recipes(Some(&json!([sparse]).to_string())) else {
            panic!("expected recipes");
        };
        assert_eq!(recipes[0].tips, "");
        assert!(recipes[0].tags.is_empty());
        assert_eq!(recipes[0].servings, 0);
        assert_eq!(recipes[0].nutritional_info.protein, "");
        assert_eq!(recipes[0].nutritional_info.calories, 520);
    }

    #[test]
    fn test_parse_still_rejects_null_required_field() {
        let mut broken = recipe_json("Broken");
        broken["cookTime"] = Value::Null;
        let RecipeParse::Invalid(err) = parse_recipes(Some(&json!([broken]).to_string())) else {
            panic!("expected invalid");
        };
        assert_eq!(err.to_string(), "recipe #1: missing required field 'cookTime'");
    }

    #[test]
    fn test_payload_level_error_has_no_recipe_prefix() {
        let RecipeParse::Invalid(err) = parse_recipes(Some("42")) else {
            panic!("expected invalid");
        };
        assert_eq!(err.to_string(), "expected a JSON array of recipes, got a number");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_call() {
        let service = RecipeService::new(Config::default(), FakeBackend::new(FakeReply::Empty));
        let result = service.generate_recipes(&state_with(&["rice"])).await;
        assert!(matches!(result, Err(RecipeError::Configuration(_))));
        assert_eq!(service.backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_generates_three_recipes() {
        let payload = json!([recipe_json("A"), recipe_json("B"), recipe_json("C")]).to_string();
        let service = RecipeService::new(keyed_config(), FakeBackend::new(FakeReply::Text(payload)));
        let recipes = service
            .generate_recipes(&state_with(&["chicken", "rice"]))
            .await
            .unwrap();
        let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(service.backend().call_count(), 1);

        let sent = service.backend().last_request.lock().unwrap().clone().unwrap();
        let prompt = sent.contents[0].parts[0].text.clone().unwrap();
        assert!(prompt.contains("chicken, rice"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_zero_recipes() {
        let service = RecipeService::new(keyed_config(), FakeBackend::new(FakeReply::Empty));
        let recipes = service.generate_recipes(&state_with(&["kale"])).await.unwrap();
        assert!(recipes.is_empty());
    }

    #[tokio::test]
    async fn test_transport_and_payload_failures_are_distinct() {
        let failing = RecipeService::new(keyed_config(), FakeBackend::new(FakeReply::Fail(503)));
        let err = failing.generate_recipes(&state_with(&["kale"])).await.unwrap_err();
        assert!(matches!(err, RecipeError::Generation(GenerationError::Transport(_))));
        assert_eq!(failing.backend().call_count(), 1);

        let garbage = RecipeService::new(
            keyed_config(),
            FakeBackend::new(FakeReply::Text("not json".to_string())),
        );
        let err = garbage.generate_recipes(&state_with(&["kale"])).await.unwrap_err();
        assert!(matches!(err, RecipeError::Generation(GenerationError::InvalidResponse(_))));
    }
}
