//! Database connection lifecycle
//!
//! One logical connection per process, shared by every caller. Concurrent
//! cold-start requests are coalesced into a single in-flight attempt; a
//! failed attempt is forgotten so the next call retries.

use std::any::Any;
use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::{DatabaseConfig, DATABASE_URL_VAR};

/// Boxed error returned by a [`Connector`]
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Connection acquisition failure.
///
/// Cloneable so a single failed attempt can be delivered to every caller
/// that was waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    /// Required configuration is missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The underlying connect call failed
    #[error("connection error: {0}")]
    Connection(Arc<dyn StdError + Send + Sync>),
}

/// A connector panicked instead of returning an error.
#[derive(Debug, Error)]
#[error("connector panicked: {0}")]
struct ConnectorPanic(String);

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Opens the underlying connection handle.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Clone + Send + Sync + 'static;

    async fn connect(&self, uri: &str) -> Result<Self::Connection, BoxError>;
}

/// PostgreSQL connector producing an sqlx pool.
///
/// Connects eagerly so work issued before the database is reachable fails
/// immediately instead of queuing behind a lazy pool.
#[derive(Debug, Clone)]
pub struct PgConnector {
    max_connections: u32,
    acquire_timeout: std::time::Duration,
}

impl PgConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            acquire_timeout: config.acquire_timeout(),
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Connection = PgPool;

    async fn connect(&self, uri: &str) -> Result<PgPool, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(uri)
            .await?;
        Ok(pool)
    }
}

type Attempt<T> = Shared<BoxFuture<'static, Result<T, ConnectError>>>;

struct State<T> {
    active: Option<T>,
    pending: Option<Attempt<T>>,
}

/// Process-wide connection cache with single-flight connection attempts.
///
/// Construct once at startup and hand out by reference (or inside an `Arc`).
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    uri: Option<String>,
    state: Arc<Mutex<State<C::Connection>>>,
}

impl ConnectionManager<PgConnector> {
    /// PostgreSQL manager configured from the environment.
    pub fn from_env() -> Self {
        let config = DatabaseConfig::from_env();
        Self::new(PgConnector::new(&config), config.url)
    }
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, uri: Option<String>) -> Self {
        Self {
            connector: Arc::new(connector),
            uri,
            state: Arc::new(Mutex::new(State {
                active: None,
                pending: None,
            })),
        }
    }

    /// Return the cached connection, joining or starting an attempt if needed.
    ///
    /// At most one connect attempt is in flight at a time. The attempt runs
    /// as its own task, so a caller that stops waiting (timeout, cancelled
    /// request) does not abandon it; the task records success or clears
    /// itself on failure before any waiter sees the result.
    pub async fn acquire(&self) -> Result<C::Connection, ConnectError> {
        let attempt = {
            let mut state = self.state.lock().await;

            if let Some(conn) = &state.active {
                return Ok(conn.clone());
            }

            match state.pending.clone() {
                Some(pending) => {
                    tracing::debug!("joining in-flight connection attempt");
                    pending
                }
                None => {
                    let attempt = self.start_attempt()?;
                    state.pending = Some(attempt.clone());
                    attempt
                }
            }
        };

        attempt.await
    }

    fn start_attempt(&self) -> Result<Attempt<C::Connection>, ConnectError> {
        let uri = self.uri.clone().ok_or_else(|| {
            ConnectError::Configuration(format!(
                "{DATABASE_URL_VAR} is not set; define it in the environment or a .env file"
            ))
        })?;

        let connector = Arc::clone(&self.connector);
        let state = Arc::clone(&self.state);
        let waiter_state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            tracing::info!("connecting to database");
            let result = match AssertUnwindSafe(connector.connect(&uri))
                .catch_unwind()
                .await
            {
                Ok(connected) => connected.map_err(|e| ConnectError::Connection(Arc::from(e))),
                Err(panic) => Err(ConnectError::Connection(Arc::new(ConnectorPanic(
                    panic_message(panic.as_ref()),
                )))),
            };

            let mut state = state.lock().await;
            state.pending = None;
            match &result {
                Ok(conn) => {
                    state.active = Some(conn.clone());
                    tracing::info!("database connection established");
                }
                Err(e) => tracing::warn!(error = %e, "database connection failed"),
            }
            result
        });

        Ok(async move {
            match task.await {
                Ok(result) => result,
                Err(join_err) => {
                    // The task never reached its own bookkeeping.
                    waiter_state.lock().await.pending = None;
                    tracing::warn!(error = %join_err, "connection task did not complete");
                    Err(ConnectError::Connection(Arc::new(join_err)))
                }
            }
        }
        .boxed()
        .shared())
    }

    /// Whether a connection is cached.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.active.is_some()
    }

    /// Drop the cached connection; the next `acquire` reconnects.
    pub async fn disconnect(&self) -> Option<C::Connection> {
        let conn = self.state.lock().await.active.take();
        if conn.is_some() {
            tracing::info!("database connection released");
        }
        conn
    }
}
