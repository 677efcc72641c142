pub mod api_connection;
pub mod cli;
pub mod config;
pub mod recipe_service;
pub mod render;
pub mod repl;
pub mod search_state;
pub mod session;
pub mod types;

pub use recipe_service::{GenerationError, RecipeError, RecipeService};
pub use search_state::{SearchEvent, SearchState};
pub use session::Session;
pub use types::{DietaryPreference, Ingredient, MealType, NutritionalInfo, Recipe};
