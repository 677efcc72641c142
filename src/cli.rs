use clap::Parser;

use crate::search_state::SearchEvent;
use crate::types::{DietaryPreference, MealType};

#[derive(Parser, Debug)]
#[command(author, version, about = "Suggests recipes for the ingredients you have on hand", long_about = None)]
pub struct Cli {
    /// Ingredient to start with (repeat for more)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,

    /// Dietary preference, e.g. "vegan" or "gluten-free"
    #[arg(short, long, default_value_t = DietaryPreference::None)]
    pub dietary: DietaryPreference,

    /// Meal type, e.g. "dinner"
    #[arg(short, long, default_value_t = MealType::Any)]
    pub meal_type: MealType,

    /// Model name, overrides RECIPE_GENIE_MODEL
    #[arg(long)]
    pub model: Option<String>,

    /// API base URL, overrides GEMINI_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Generate once with the given inputs and exit instead of starting a session
    #[arg(long)]
    pub once: bool,

    /// With --once, print the recipes as JSON
    #[arg(long, requires = "once")]
    pub json: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// A line typed into the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(SearchEvent),
    Generate,
    Show(usize),
    Close,
    List,
    Status,
    Reset,
    Help,
    Quit,
}

pub const HELP_TEXT: &str = "\
Commands:
  add <ingredient>     add an ingredient
  remove <ingredient>  remove an ingredient
  diet <preference>    None, Vegetarian, Vegan, Gluten Free, Keto, Paleo
  meal <type>          Any, Breakfast, Lunch, Dinner, Snack, Dessert
  generate             ask for recipes
  show <n>             open recipe n
  close                close the open recipe
  list                 show the result cards again
  status               show ingredients and filters
  reset                start over with an empty pantry
  help                 this text
  quit                 leave";

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let needs_arg = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("'{}' needs {}", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            "add" | "a" => Ok(Command::Search(SearchEvent::AddIngredient(needs_arg(
                "an ingredient",
            )?))),
            "remove" | "rm" => Ok(Command::Search(SearchEvent::RemoveIngredient(needs_arg(
                "an ingredient",
            )?))),
            "diet" | "dietary" => {
                let value = needs_arg("a dietary preference")?.parse()?;
                Ok(Command::Search(SearchEvent::SetDietary(value)))
            }
            "meal" => {
                let value = needs_arg("a meal type")?.parse()?;
                Ok(Command::Search(SearchEvent::SetMealType(value)))
            }
            "generate" | "go" | "g" => Ok(Command::Generate),
            "show" | "open" => {
                let n: usize = needs_arg("a recipe number")?
                    .parse()
                    .map_err(|_| format!("'{}' is not a recipe number", rest))?;
                if n == 0 {
                    return Err("recipe numbers start at 1".to_string());
                }
                Ok(Command::Show(n - 1))
            }
            "close" => Ok(Command::Close),
            "list" | "ls" => Ok(Command::List),
            "status" => Ok(Command::Status),
            "reset" => Ok(Command::Reset),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("type 'help' for commands".to_string()),
            other => Err(format!("unknown command '{}', type 'help' for commands", other)),
        }
    }
}
