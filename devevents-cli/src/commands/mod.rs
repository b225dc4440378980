//! Command implementations for the devevents CLI

pub mod booking;
pub mod event;
pub mod normalize;

use anyhow::{Context, Result};
use devevents_store::{schema, ConnectionManager, PgStore, Records};
use serde::Serialize;

pub use booking::run_booking;
pub use event::run_event;
pub use normalize::run_normalize;

/// Connect using `DATABASE_URL` and wrap the pool for validated writes.
pub(crate) async fn connect() -> Result<Records<PgStore>> {
    let manager = ConnectionManager::from_env();
    let pool = manager
        .acquire()
        .await
        .map_err(devevents_store::Error::from)?;
    tracing::debug!("connected; opening record store");
    Ok(Records::new(PgStore::new(pool)))
}

/// Print a record (or list of records) as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

pub async fn run_migrate() -> Result<()> {
    let records = connect().await?;
    tracing::info!("applying schema");
    schema::migrate(records.store().pool())
        .await
        .context("Migration failed")?;
    tracing::info!("schema applied");
    println!("Schema is up to date");
    Ok(())
}
