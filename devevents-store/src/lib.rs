//! devevents-store: connections, storage and the validated-save pipeline
//!
//! Obtain a connection from a [`ConnectionManager`] once per operation, wrap
//! it in a store, and write through [`Records`] so every event and booking is
//! validated before it is committed.

pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod records;
pub mod schema;

pub use config::DatabaseConfig;
pub use connection::{ConnectError, ConnectionManager, Connector, PgConnector};
pub use db::{EventFilter, MemoryStore, PgStore, Store};
pub use error::{Error, Result, StoreError};
pub use records::Records;
