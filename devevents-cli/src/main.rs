//! devevents CLI - operator tooling for the developer-events store
//!
//! - Apply the database schema (`migrate`)
//! - Create, update and inspect events (`event`)
//! - Create and list bookings (`booking`)
//! - Check how a title, date or time will be normalized (`normalize`)

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "devevents",
    author,
    version,
    about = "Validated event and booking records for the developer-events listing"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tables and indexes (idempotent)
    Migrate,
    /// Create, update, show and list events
    Event(commands::event::EventArgs),
    /// Create and list bookings
    Booking(commands::booking::BookingArgs),
    /// Show the canonical form of a slug, date or time without touching the database
    Normalize(commands::normalize::NormalizeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Migrate => commands::run_migrate().await?,
        Commands::Event(args) => commands::run_event(args).await?,
        Commands::Booking(args) => commands::run_booking(args).await?,
        Commands::Normalize(args) => commands::run_normalize(args)?,
    }

    Ok(())
}
