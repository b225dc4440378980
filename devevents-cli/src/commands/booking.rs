//! Booking commands
//!
//! Commands: booking create, booking list

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use devevents_core::BookingDraft;
use uuid::Uuid;

use super::{connect, print_json};

#[derive(Parser, Debug)]
pub struct BookingArgs {
    #[command(subcommand)]
    pub command: BookingCommand,
}

#[derive(Subcommand, Debug)]
pub enum BookingCommand {
    /// Book an event for an email address
    Create {
        /// Id of the event to book
        #[arg(long)]
        event_id: String,
        /// Attendee email address
        #[arg(long)]
        email: String,
    },
    /// List bookings for an event or an email address
    List(ListArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ListArgs {
    /// Bookings for this event, newest first
    #[arg(long)]
    event_id: Option<Uuid>,
    /// Bookings made with this address, newest first
    #[arg(long)]
    email: Option<String>,
}

pub async fn run_booking(args: BookingArgs) -> Result<()> {
    let records = connect().await?;
    match args.command {
        BookingCommand::Create { event_id, email } => {
            let booking = records
                .create_booking(BookingDraft { event_id, email })
                .await?;
            print_json(&booking)
        }
        BookingCommand::List(ListArgs { event_id, email }) => {
            let bookings = match (event_id, email) {
                (Some(id), _) => records.bookings_for_event(id).await?,
                (None, Some(email)) => records.bookings_for_email(&email).await?,
                (None, None) => Vec::new(),
            };
            print_json(&bookings)
        }
    }
}
