//! Interactive terminal session: reads commands, updates the [`Session`],
//! prints what changed.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api_connection::connection::ModelBackend;
use crate::cli::{Command, HELP_TEXT};
use crate::recipe_service::RecipeService;
use crate::render;
use crate::search_state::SearchEvent;
use crate::session::Session;

/// Whether the loop should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn handle_command<B, W>(
    command: Command,
    session: &mut Session,
    service: &RecipeService<B>,
    out: &mut W,
) -> Result<Flow>
where
    B: ModelBackend,
    W: Write,
{
    match command {
        Command::Search(event) => {
            let described = describe(&event);
            if session.dispatch(event) {
                writeln!(out, "{}", described)?;
            } else {
                writeln!(out, "Nothing changed.")?;
            }
            write!(out, "{}", render::render_search_state(session.search()))?;
        }
        Command::Generate => {
            if !session.can_generate() {
                writeln!(out, "Add at least one ingredient before generating.")?;
                return Ok(Flow::Continue);
            }
            writeln!(out, "Creating Magic...")?;
            out.flush()?;
            session.generate(service).await;
            if let Some(message) = session.error() {
                write!(out, "{}", render::render_error_banner(message))?;
            } else if session.recipes().is_empty() {
                writeln!(out, "No recipes came back. Try different ingredients.")?;
            } else {
                write!(out, "{}", render::render_results(session.recipes()))?;
            }
        }
        Command::Show(index) => match session.select(index) {
            Ok(recipe) => write!(out, "{}", render::render_detail(recipe))?,
            Err(e) => writeln!(out, "{}", e)?,
        },
        Command::Close => {
            session.close_detail();
            writeln!(out, "Closed.")?;
        }
        Command::List => {
            if session.recipes().is_empty() {
                writeln!(out, "No recipes yet.")?;
            } else {
                write!(out, "{}", render::render_results(session.recipes()))?;
            }
        }
        Command::Status => write!(out, "{}", render::render_session(session))?,
        Command::Reset => {
            *session = Session::new();
            write!(out, "{}", render::render_session(session))?;
        }
        Command::Help => writeln!(out, "{}", HELP_TEXT)?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn describe(event: &SearchEvent) -> String {
    match event {
        SearchEvent::AddIngredient(text) => format!("Added {}.", text.trim()),
        SearchEvent::RemoveIngredient(text) => format!("Removed {}.", text),
        SearchEvent::SetDietary(value) => format!("Dietary preference set to {}.", value),
        SearchEvent::SetMealType(value) => format!("Meal type set to {}.", value),
    }
}

/// Runs until `quit` or end of input.
pub async fn run<R, B, W>(
    input: R,
    session: &mut Session,
    service: &RecipeService<B>,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    B: ModelBackend,
    W: Write,
{
    writeln!(out, "RecipeGenie - What's in your kitchen?")?;
    write!(out, "{}", render::render_session(session))?;
    writeln!(out, "Type 'help' for commands.")?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        match Command::parse(&line) {
            Ok(command) => {
                if handle_command(command, session, service, out).await? == Flow::Quit {
                    break;
                }
            }
            Err(message) => writeln!(out, "{}", message)?,
        }
    }
    writeln!(out, "Bye!")?;
    Ok(())
}
