//! Event commands
//!
//! Commands: event create, event update, event show, event list

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devevents_core::{EventDraft, Mode};
use devevents_store::EventFilter;
use uuid::Uuid;

use super::{connect, print_json};

#[derive(Parser, Debug)]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Create an event from a JSON document
    Create {
        /// Path to the event JSON (title, description, overview, image, venue, ...)
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },
    /// Replace an existing event with a JSON document
    Update {
        /// Event id
        #[arg(long)]
        id: Uuid,
        /// Path to the full replacement event JSON
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },
    /// Show one event by slug
    Show {
        /// Event slug
        slug: String,
    },
    /// List events, optionally filtered
    List {
        /// Only events on this date (any supported spelling)
        #[arg(long)]
        date: Option<String>,
        /// Only events with this mode (online, offline, hybrid)
        #[arg(long, value_parser = parse_mode)]
        mode: Option<Mode>,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

pub(crate) fn read_draft(path: &Path) -> Result<EventDraft> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid event JSON in {}", path.display()))
}

pub async fn run_event(args: EventArgs) -> Result<()> {
    match args.command {
        EventCommand::Create { file } => {
            let draft = read_draft(&file)?;
            let records = connect().await?;
            print_json(&records.create_event(draft).await?)
        }
        EventCommand::Update { id, file } => {
            let draft = read_draft(&file)?;
            let records = connect().await?;
            print_json(&records.update_event(id, draft).await?)
        }
        EventCommand::Show { slug } => {
            let records = connect().await?;
            print_json(&records.event_by_slug(&slug).await?)
        }
        EventCommand::List { date, mode } => {
            let records = connect().await?;
            print_json(&records.list_events(EventFilter { date, mode }).await?)
        }
    }
}
