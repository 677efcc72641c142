//! Plain-text rendering of the session for the terminal.

use std::fmt::Write;

use crate::search_state::SearchState;
use crate::session::Session;
use crate::types::Recipe;

const MAX_CARD_TAGS: usize = 3;

pub fn render_search_state(state: &SearchState) -> String {
    let mut out = String::new();
    if state.has_ingredients() {
        let chips: Vec<String> = state
            .ingredients()
            .iter()
            .map(|i| format!("[{}]", i))
            .collect();
        let _ = writeln!(out, "Ingredients: {}", chips.join(" "));
    } else {
        let _ = writeln!(out, "Add ingredients to start cooking...");
    }
    let _ = writeln!(
        out,
        "Dietary Preference: {} | Meal Type: {}",
        state.dietary, state.meal_type
    );
    out
}

pub fn render_generate_button(session: &Session) -> &'static str {
    if session.is_loading() {
        "[ Creating Magic... ]"
    } else if session.can_generate() {
        "[ Generate Recipes ]"
    } else {
        "[ Generate Recipes ] (add an ingredient first)"
    }
}

pub fn render_error_banner(message: &str) -> String {
    format!("! Oops! Something went wrong.\n! {}\n", message)
}

pub fn render_card(recipe: &Recipe, index: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", index + 1, recipe.name);
    let _ = writeln!(out, "   {}", recipe.description);
    let _ = writeln!(
        out,
        "   {} + {} | {} Servings",
        recipe.prep_time, recipe.cook_time, recipe.servings
    );
    let tags: Vec<&str> = recipe
        .tags
        .iter()
        .take(MAX_CARD_TAGS)
        .map(String::as_str)
        .collect();
    if !tags.is_empty() {
        let _ = writeln!(out, "   Tags: {}", tags.join(", "));
    }
    out
}

pub fn render_results(recipes: &[Recipe]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Recommended for You ({} Results)", recipes.len());
    for (index, recipe) in recipes.iter().enumerate() {
        out.push('\n');
        out.push_str(&render_card(recipe, index));
    }
    out
}

pub fn render_detail(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", recipe.name);
    let _ = writeln!(out, "{}", recipe.description);
    let _ = writeln!(
        out,
        "Prep: {} | Cook: {} | Serves: {}",
        recipe.prep_time, recipe.cook_time, recipe.servings
    );

    let _ = writeln!(out, "\nNutrition (per serving)");
    let _ = writeln!(out, "  {} Calories", recipe.nutritional_info.calories);
    for (label, grams) in recipe.nutritional_info.macro_grams() {
        let _ = writeln!(out, "  {:<8}{}g", label, grams);
    }

    if !recipe.tips.is_empty() {
        let _ = writeln!(out, "\nChef's Tip\n  \"{}\"", recipe.tips);
    }

    let _ = writeln!(out, "\nIngredients");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(out, "  - {}", ingredient);
    }

    let _ = writeln!(out, "\nInstructions");
    for (step, text) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", step + 1, text);
    }
    out
}

/// Full screen: inputs, action, then whichever of error/results/welcome applies.
pub fn render_session(session: &Session) -> String {
    let mut out = render_search_state(session.search());
    let _ = writeln!(out, "{}", render_generate_button(session));

    if let Some(message) = session.error() {
        out.push('\n');
        out.push_str(&render_error_banner(message));
    }
    if !session.recipes().is_empty() {
        out.push('\n');
        out.push_str(&render_results(session.recipes()));
    } else if !session.is_loading() && !session.search().has_ingredients() {
        let _ = writeln!(out, "\nYour personal chef is waiting...");
    }
    out
}
