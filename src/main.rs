use std::io::Write;

use anyhow::{bail, Context, Result};
use recipe_genie::api_connection::Provider;
use recipe_genie::cli::{parse_args, Cli};
use recipe_genie::config::Config;
use recipe_genie::recipe_service::RecipeService;
use recipe_genie::render;
use recipe_genie::repl;
use recipe_genie::search_state::{SearchEvent, SearchState};
use recipe_genie::session::Session;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn initial_search(cli: &Cli) -> SearchState {
    let mut search = SearchState::new();
    for ingredient in &cli.ingredients {
        search.apply(SearchEvent::AddIngredient(ingredient.clone()));
    }
    search.apply(SearchEvent::SetDietary(cli.dietary));
    search.apply(SearchEvent::SetMealType(cli.meal_type));
    search
}

async fn run_once(
    cli: &Cli,
    session: &Session,
    service: &RecipeService<Provider>,
) -> Result<()> {
    if !session.can_generate() {
        bail!("--once needs at least one --ingredient");
    }
    // Go straight to the service so the real error reaches the exit status.
    let recipes = service
        .generate_recipes(session.search())
        .await
        .context("Recipe generation failed")?;

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &recipes)
            .context("Failed to write recipes as JSON")?;
        writeln!(stdout)?;
        return Ok(());
    }

    write!(stdout, "{}", render::render_search_state(session.search()))?;
    if recipes.is_empty() {
        writeln!(stdout, "\nNo recipes came back. Try different ingredients.")?;
        return Ok(());
    }
    writeln!(stdout)?;
    write!(stdout, "{}", render::render_results(&recipes))?;
    for recipe in &recipes {
        writeln!(stdout)?;
        write!(stdout, "{}", render::render_detail(recipe))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = parse_args();
    let config = Config::from_env()
        .with_model(cli.model.clone())
        .with_base_url(cli.base_url.clone());
    tracing::debug!(?config, "configuration loaded");
    if !config.has_api_key() {
        tracing::warn!("no API key configured; generation will fail until GEMINI_API_KEY is set");
    }

    let provider = Provider::gemini(&config.base_url, &config.model);
    let service = RecipeService::new(config, provider);
    let mut session = Session::with_search(initial_search(&cli));

    if cli.once {
        return run_once(&cli, &session, &service).await;
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    repl::run(stdin, &mut session, &service, &mut stdout).await
}
