//! Offline normalization preview
//!
//! Command: normalize slug|date|time <value>

use anyhow::Result;
use clap::{Parser, Subcommand};
use devevents_core::{normalize_date, normalize_time, slugify, ValidationError};

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    #[command(subcommand)]
    pub command: NormalizeCommand,
}

#[derive(Subcommand, Debug)]
pub enum NormalizeCommand {
    /// Slug derived from an event title
    Slug { title: String },
    /// Canonical YYYY-MM-DD form of a date
    Date { value: String },
    /// Canonical 24-hour HH:MM form of a time
    Time { value: String },
}

pub fn normalize(command: &NormalizeCommand) -> Result<String> {
    let out = match command {
        NormalizeCommand::Slug { title } => {
            let slug = slugify(title);
            if slug.is_empty() {
                return Err(ValidationError::InvalidFormat {
                    field: "title",
                    reason: "must contain at least one ASCII letter or digit",
                }
                .into());
            }
            slug
        }
        NormalizeCommand::Date { value } => normalize_date(value)?,
        NormalizeCommand::Time { value } => normalize_time(value)?,
    };
    Ok(out)
}

pub fn run_normalize(args: NormalizeArgs) -> Result<()> {
    println!("{}", normalize(&args.command)?);
    Ok(())
}
