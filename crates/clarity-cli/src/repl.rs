//! Interactive session loop.
//!
//! Each input line is parsed as a multicall clap command. Gateway calls are
//! awaited before the next line is read, so one analysis can never overlap
//! another.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clarity_ai::InferenceGateway;
use clarity_core::Item;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::display;
use crate::session::Session;

const HELP: &str = "\
Commands:
  open <path>            select an image of a storage space
  clear                  clear the selected image
  analyze                analyze the selected image and add it to the inventory
  list                   show the inventory, filtered by the current search
  search [query]         filter items by name or category; no query clears the search
  edit <loc> <item>      edit an item in place
  label <loc>            suggest a bin label for one location
  labels                 suggest labels for every location
  dismiss <loc>          close a suggested label
  status                 show the selection, inventory size, and last error
  help                   show this message
  quit                   leave the session (the inventory is not saved)";

#[derive(Parser, Debug)]
#[command(multicall = true, disable_help_subcommand = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug)]
enum ReplCommand {
    /// Select an image
    Open {
        #[arg(required = true, num_args = 1..)]
        path: Vec<String>,
    },
    /// Clear the selected image
    Clear,
    /// Analyze the selected image
    Analyze,
    /// Show the inventory
    #[command(alias = "ls")]
    List,
    /// Set or clear the search query
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Edit an item in place
    Edit {
        #[arg(value_parser = parse_position)]
        location: usize,
        #[arg(value_parser = parse_position)]
        item: usize,
    },
    /// Suggest a label for one location
    Label {
        #[arg(value_parser = parse_position)]
        location: usize,
    },
    /// Suggest labels for every location
    Labels,
    /// Close a suggested label
    Dismiss {
        #[arg(value_parser = parse_position)]
        location: usize,
    },
    /// Show session status
    Status,
    /// Show available commands
    Help,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Parse a 1-based position into a 0-based index.
fn parse_position(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(e) => Err(e.to_string()),
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Run the interactive loop until `quit` or end of input.
pub async fn run<G, R, W>(session: &mut Session<G>, input: R, out: &mut W) -> anyhow::Result<()>
where
    G: InferenceGateway,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "Clutter-to-Clarity: AI-powered inventory. Type `help` for commands.")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match ReplLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                write!(out, "{e}")?;
                continue;
            }
        };

        // `search` and `open` take the rest of the line as typed.
        let rest = line
            .split_once(char::is_whitespace)
            .map_or("", |(_, rest)| rest);

        if let Flow::Quit = execute(session, command, rest, &mut lines, out).await? {
            break;
        }
    }
    Ok(())
}

async fn execute<G, R, W>(
    session: &mut Session<G>,
    command: ReplCommand,
    rest: &str,
    lines: &mut Lines<R>,
    out: &mut W,
) -> anyhow::Result<Flow>
where
    G: InferenceGateway,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match command {
        ReplCommand::Open { path } => {
            let path = match path.as_slice() {
                [single] => PathBuf::from(single),
                _ => PathBuf::from(rest.trim_start()),
            };
            match session.select_image(&path).await {
                Ok(preview) => writeln!(
                    out,
                    "Selected {} ({}, {} bytes). Run `analyze` when ready.",
                    preview.path().display(),
                    preview.mime_type(),
                    preview.size()
                )?,
                Err(e) => writeln!(out, "Error: {e}")?,
            }
        }
        ReplCommand::Clear => {
            session.clear_selection();
            writeln!(out, "Selection cleared.")?;
        }
        ReplCommand::Analyze => {
            if session.can_analyze() {
                writeln!(out, "Analyzing your space... please wait.")?;
                out.flush()?;
            }
            match session.analyze().await {
                Ok(index) => {
                    let view = session.view();
                    match view.iter().find(|l| l.index == index) {
                        Some(location) => {
                            display::render_card(out, location, session.label(index))?
                        }
                        None => writeln!(
                            out,
                            "Added location #{}; it is hidden by the current search.",
                            index + 1
                        )?,
                    }
                }
                Err(e) => writeln!(out, "Error: {e}")?,
            }
        }
        ReplCommand::List => display::render_inventory(out, session)?,
        ReplCommand::Search { query } => {
            session.set_query(if query.is_empty() { "" } else { rest });
            display::render_inventory(out, session)?;
        }
        ReplCommand::Edit { location, item } => edit(session, location, item, lines, out).await?,
        ReplCommand::Label { location } => {
            writeln!(out, "Generating...")?;
            out.flush()?;
            match session.suggest_label(location).await {
                Ok(label) => writeln!(out, "Suggested label for #{}: {label}", location + 1)?,
                Err(e) => writeln!(out, "Error: {e}")?,
            }
        }
        ReplCommand::Labels => {
            let total = session.inventory().len();
            writeln!(out, "Generating {total} labels...")?;
            out.flush()?;
            let succeeded = session.suggest_all_labels().await;
            writeln!(out, "{succeeded} of {total} labels generated.")?;
            display::render_inventory(out, session)?;
        }
        ReplCommand::Dismiss { location } => match session.dismiss_label(location) {
            Ok(()) => writeln!(out, "Label closed.")?,
            Err(e) => writeln!(out, "Error: {e}")?,
        },
        ReplCommand::Status => display::render_status(out, session)?,
        ReplCommand::Help => writeln!(out, "{HELP}")?,
        ReplCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Edit/save/cancel interaction for one item.
async fn edit<G, R, W>(
    session: &mut Session<G>,
    location: usize,
    item: usize,
    lines: &mut Lines<R>,
    out: &mut W,
) -> anyhow::Result<()>
where
    G: InferenceGateway,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let current = match session.begin_edit(location, item) {
        Ok(current) => current,
        Err(e) => {
            writeln!(out, "Error: {e}")?;
            return Ok(());
        }
    };
    display::render_edit_header(out, location, item, &current)?;

    let Some(name) = ask(lines, out, "name", &current.name).await? else {
        return cancel(session, out);
    };

    let quantity = loop {
        let Some(answer) = ask(lines, out, "quantity", &current.quantity.to_string()).await?
        else {
            return cancel(session, out);
        };
        match answer.parse::<u32>() {
            Ok(q) => break q,
            Err(_) => writeln!(out, "Quantity must be a whole number of 0 or more.")?,
        }
    };

    let Some(category) = ask(lines, out, "category", &current.category).await? else {
        return cancel(session, out);
    };

    match session.save_edit(Item::new(name, quantity, category)) {
        Ok(()) => writeln!(out, "Saved.")?,
        Err(e) => writeln!(out, "Error: {e}")?,
    }
    Ok(())
}

/// Prompt for one field. Blank keeps `current`; `cancel` or end of input yields `None`.
async fn ask<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    field: &str,
    current: &str,
) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "  {field} [{current}]: ")?;
    out.flush()?;
    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    let answer = line.trim();
    Ok(match answer {
        "cancel" => None,
        "" => Some(current.to_string()),
        other => Some(other.to_string()),
    })
}

fn cancel<G: InferenceGateway>(
    session: &mut Session<G>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    session.cancel_edit();
    writeln!(out, "Edit cancelled.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{ScriptedGateway, garage, image_file, pantry};

    async fn drive(session: &mut Session<ScriptedGateway>, script: &str) -> String {
        let mut out = Vec::new();
        run(session, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(parse_position("1"), Ok(0));
        assert_eq!(parse_position("12"), Ok(11));
        assert!(parse_position("0").is_err());
        assert!(parse_position("x").is_err());
    }

    #[test]
    fn parses_multi_word_search() {
        let parsed = ReplLine::try_parse_from(["search", "tuna", "can"]).unwrap();
        match parsed.command {
            ReplCommand::Search { query } => assert_eq!(query.join(" "), "tuna can"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(ReplLine::try_parse_from(["frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn open_analyze_list() {
        let image = image_file();
        let mut session = Session::new(ScriptedGateway::default().with_location(pantry()));
        let script = format!("open {}\nanalyze\nlist\nquit\n", image.path().display());

        let text = drive(&mut session, &script).await;
        assert!(text.contains("Selected "));
        assert!(text.contains("Analyzing your space... please wait."));
        assert!(text.contains("=== #1 Pantry ==="));
        assert!(text.contains("Your Inventory (1 locations, 4 items)"));
        assert_eq!(session.inventory().len(), 1);
    }

    #[tokio::test]
    async fn analyze_without_selection_reports_error() {
        let mut session = Session::new(ScriptedGateway::default());
        let text = drive(&mut session, "analyze\n").await;
        assert!(text.contains("Error: Please select an image first."));
        assert!(!text.contains("Analyzing your space"));
    }

    #[tokio::test]
    async fn edit_with_defaults_and_new_values() {
        let image = image_file();
        let mut session = Session::new(ScriptedGateway::default().with_location(pantry()));
        let script = format!(
            "open {}\nanalyze\nedit 1 1\n\nlots\n5\nCanned Food\nquit\n",
            image.path().display()
        );

        let text = drive(&mut session, &script).await;
        assert!(text.contains("Quantity must be a whole number"));
        assert!(text.contains("Saved."));
        assert_eq!(
            session.inventory().item(0, 0),
            Some(&Item::new("Tuna", 5, "Canned Food"))
        );
        assert_eq!(
            session.inventory().item(0, 1),
            Some(&Item::new("Hammer", 1, "Tools"))
        );
    }

    #[tokio::test]
    async fn edit_cancel_keeps_item() {
        let image = image_file();
        let mut session = Session::new(ScriptedGateway::default().with_location(pantry()));
        let script = format!(
            "open {}\nanalyze\nedit 1 2\nMallet\ncancel\n",
            image.path().display()
        );

        let text = drive(&mut session, &script).await;
        assert!(text.contains("Edit cancelled."));
        assert_eq!(session.inventory().get(0), Some(&pantry()));
        assert!(session.editing().is_none());
    }

    #[tokio::test]
    async fn search_then_label() {
        let image = image_file();
        let mut session = Session::new(
            ScriptedGateway::default()
                .with_location(pantry())
                .with_location(garage())
                .with_label("Tool Box"),
        );
        let path = image.path().display().to_string();
        let script =
            format!("open {path}\nanalyze\nopen {path}\nanalyze\nsearch WRENCH\nlabel 2\nsearch\n");

        let text = drive(&mut session, &script).await;
        assert!(text.contains("Search: \"WRENCH\""));
        assert!(text.contains("Suggested label for #2: Tool Box"));
        assert_eq!(session.query(), "");
    }

    #[tokio::test]
    async fn search_keeps_spacing_as_typed() {
        let mut session = Session::new(ScriptedGateway::default());
        drive(&mut session, "search  can   opener \n").await;
        assert_eq!(session.query(), " can   opener");

        drive(&mut session, "search\n").await;
        assert_eq!(session.query(), "");
    }

    #[tokio::test]
    async fn open_path_with_repeated_spaces() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("top  shelf.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let mut session = Session::new(ScriptedGateway::default());
        let text = drive(&mut session, &format!("open {}\n", path.display())).await;
        assert!(text.contains("Selected "), "{text}");
        assert_eq!(session.selection().unwrap().path(), path.as_path());
    }

    #[tokio::test]
    async fn bad_index_is_reported() {
        let mut session = Session::new(ScriptedGateway::default());
        let text = drive(&mut session, "edit 3 1\nlabel 0\n").await;
        assert!(text.contains("Error: No location #3"));
        assert!(text.contains("positions start at 1"));
    }
}
