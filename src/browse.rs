//! Interactive terminal session (`dv browse`).
//!
//! Reads line commands from stdin and drives a [`Viewer`] with a
//! [`TextRenderer`]. The first dataset is loaded before input is accepted;
//! later month switches are fetched in background tasks so typing is never
//! blocked. Completed fetches come back over a channel and are applied
//! through the viewer's load tickets, so a slow response for a month the
//! user already left is dropped.
//!
//! | Input | Effect |
//! |-------|--------|
//! | any text | set the search query (empty line clears it) |
//! | `/month <m>` | switch dataset |
//! | `/months` | list months |
//! | `/platform <v>`, `/topic <v>` | toggle a chip |
//! | `/reset platform\|topic\|all` | clear a chip group, or every filter |
//! | `/tags` | show both chip groups |
//! | `/help`, `/quit` | |

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::session::UnknownMonth;
use crate::source::{open_source, DataSource};
use crate::text::TextRenderer;
use digest_viewer_core::models::TagField;
use digest_viewer_core::viewer::{LoadTicket, Viewer};

const HELP: &str = "\
Type to search. Commands:
  /month <m>                switch month
  /months                   list months
  /platform <v>             toggle a platform chip
  /topic <v>                toggle a topic chip
  /reset platform|topic|all clear a chip group (all: every filter)
  /tags                     show chips
  /help                     this help
  /quit                     exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Month(String),
    Months,
    Toggle(TagField, String),
    /// `None` resets every filter including the query.
    Reset(Option<TagField>),
    Tags,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Query(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name, arg) {
        ("month", m) if !m.is_empty() => Command::Month(m.to_string()),
        ("months", "") => Command::Months,
        ("platform", v) if !v.is_empty() => Command::Toggle(TagField::Platform, v.to_string()),
        ("topic", v) if !v.is_empty() => Command::Toggle(TagField::Topic, v.to_string()),
        ("reset", "all") | ("reset", "") => Command::Reset(None),
        ("reset", scope) => match TagField::from_scope(scope) {
            Some(field) => Command::Reset(Some(field)),
            None => Command::Invalid(line.to_string()),
        },
        ("tags", "") => Command::Tags,
        ("help", "") => Command::Help,
        ("quit", "") | ("exit", "") | ("q", "") => Command::Quit,
        _ => Command::Invalid(line.to_string()),
    }
}

/// What the session loop should do after applying a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Print the card list.
    ShowCards,
    /// Print the chip groups.
    ShowTags,
    /// Print the month header.
    ShowMonths,
    /// Print a message.
    Say(String),
    /// Fetch this dataset in the background.
    Load(LoadTicket),
    Quit,
}

/// Apply `command` to the viewer.
pub fn apply_command(viewer: &mut Viewer<TextRenderer>, command: Command) -> Step {
    match command {
        Command::Query(q) => {
            viewer.set_query(q);
            Step::ShowCards
        }
        Command::Toggle(field, value) => {
            viewer.toggle(field, &value);
            Step::ShowCards
        }
        Command::Reset(Some(field)) => {
            viewer.reset(field);
            Step::ShowCards
        }
        Command::Reset(None) => {
            viewer.clear_filters();
            Step::ShowCards
        }
        Command::Month(month) => match viewer.begin_load(&month) {
            Some(ticket) => Step::Load(ticket),
            None => Step::Say(UnknownMonth(month).to_string()),
        },
        Command::Months => Step::ShowMonths,
        Command::Tags => Step::ShowTags,
        Command::Help => Step::Say(HELP.to_string()),
        Command::Quit => Step::Quit,
        Command::Invalid(line) => Step::Say(format!("Unknown command: {} (try /help)", line)),
    }
}

type LoadResult = (LoadTicket, Result<String>);

fn spawn_load(source: &Arc<dyn DataSource>, ticket: LoadTicket, tx: &mpsc::UnboundedSender<LoadResult>) {
    let source = Arc::clone(source);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = source.fetch_text(&ticket.path).await;
        // The receiver only disappears when the session has ended.
        let _ = tx.send((ticket, result));
    });
}

fn print_cards(viewer: &Viewer<TextRenderer>) {
    let text = viewer.renderer();
    println!("{}", text.count_line());
    if !text.cards().is_empty() {
        println!("{}", text.cards());
    }
}

fn print_tags(viewer: &Viewer<TextRenderer>) {
    for field in TagField::ALL {
        println!("{}", viewer.renderer().chips_line(field));
    }
}

fn print_view(viewer: &Viewer<TextRenderer>) {
    println!("{}", viewer.renderer().header());
    print_tags(viewer);
    print_cards(viewer);
}

/// CLI entry point for `dv browse`.
pub async fn run_browse(config: &Config, month: Option<String>) -> Result<()> {
    let source = open_source(config)?;
    let manifest = source.fetch_manifest(&config.data.manifest).await?;

    let mut viewer = Viewer::new(TextRenderer::new());
    viewer.set_manifest(manifest);

    let first = match month {
        Some(m) => viewer
            .begin_load(&m)
            .ok_or_else(|| anyhow!(UnknownMonth(m.clone())))?,
        None => viewer
            .begin_default_load()
            .ok_or_else(|| anyhow!("manifest lists no files ({})", source.describe()))?,
    };
    let text = source.fetch_text(&first.path).await?;
    viewer.finish_load(&first, &text);
    info!(month = %first.month, records = viewer.records().len(), "dataset loaded");

    print_view(&viewer);
    println!("(/help for commands)");

    let (tx, mut rx) = mpsc::unbounded_channel::<LoadResult>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match apply_command(&mut viewer, parse_command(&line)) {
                    Step::ShowCards => print_cards(&viewer),
                    Step::ShowTags => print_tags(&viewer),
                    Step::ShowMonths => println!("{}", viewer.renderer().header()),
                    Step::Say(message) => println!("{}", message),
                    Step::Load(ticket) => {
                        println!("Loading {}...", ticket.month);
                        spawn_load(&source, ticket, &tx);
                    }
                    Step::Quit => break,
                }
            }
            Some((ticket, result)) = rx.recv() => {
                match result {
                    Ok(text) => {
                        if viewer.finish_load(&ticket, &text) {
                            info!(month = %ticket.month, records = viewer.records().len(), "dataset loaded");
                            print_view(&viewer);
                        } else {
                            debug!(month = %ticket.month, "discarding stale dataset response");
                        }
                    }
                    Err(e) => {
                        warn!(month = %ticket.month, "dataset load failed: {:#}", e);
                        eprintln!("Error: {:#}", e);
                    }
                }
            }
        }
    }

    Ok(())
}
