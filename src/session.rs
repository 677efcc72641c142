//! Per-session view state: what the user typed, what came back, and whether a
//! request is running.

use anyhow::{bail, Result};

use crate::api_connection::connection::ModelBackend;
use crate::recipe_service::RecipeService;
use crate::search_state::{SearchEvent, SearchState};
use crate::types::Recipe;

/// The one message users see for any failed generation.
pub const GENERATION_FAILED_MESSAGE: &str =
    "We couldn't generate recipes at this moment. Please try again later or check your API key.";

#[derive(Debug, Default)]
pub struct Session {
    search: SearchState,
    recipes: Vec<Recipe>,
    in_flight: bool,
    error: Option<String>,
    selected: Option<usize>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session with pre-filled search inputs.
    pub fn with_search(search: SearchState) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn dispatch(&mut self, event: SearchEvent) -> bool {
        self.search.apply(event)
    }

    /// Generate is enabled only with at least one ingredient and nothing in flight.
    pub fn can_generate(&self) -> bool {
        self.search.has_ingredients() && !self.in_flight
    }

    /// Clears the previous outcome and marks a request as running.
    ///
    /// Returns `false` without touching anything when generation is disabled.
    pub fn begin_generation(&mut self) -> bool {
        if !self.can_generate() {
            return false;
        }
        self.in_flight = true;
        self.error = None;
        self.recipes.clear();
        self.selected = None;
        true
    }

    /// Records the outcome of the request started by [`Session::begin_generation`].
    pub fn finish_generation<E: std::fmt::Display>(&mut self, outcome: Result<Vec<Recipe>, E>) {
        self.in_flight = false;
        match outcome {
            Ok(recipes) => self.recipes = recipes,
            Err(err) => {
                tracing::error!(error = %err, "recipe generation failed");
                self.recipes.clear();
                self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Runs one generation against `service`. Returns `false` if generation
    /// was disabled and no request was made.
    pub async fn generate<B: ModelBackend>(&mut self, service: &RecipeService<B>) -> bool {
        if !self.begin_generation() {
            tracing::debug!("generate ignored: no ingredients or a request is already running");
            return false;
        }
        let outcome = service.generate_recipes(&self.search).await;
        self.finish_generation(outcome);
        true
    }

    /// Opens the detail view for the recipe at `index` (zero-based).
    pub fn select(&mut self, index: usize) -> Result<&Recipe> {
        if index >= self.recipes.len() {
            bail!(
                "No recipe #{} (there are {} results)",
                index + 1,
                self.recipes.len()
            );
        }
        self.selected = Some(index);
        Ok(&self.recipes[index])
    }

    pub fn selected(&self) -> Option<&Recipe> {
        self.selected.and_then(|i| self.recipes.get(i))
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }
}
