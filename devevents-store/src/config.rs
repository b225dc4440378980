//! Database configuration read from the environment

use std::time::Duration;

/// Environment variable holding the connection URI
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "DEVEVENTS_DB_MAX_CONNECTIONS";
pub const ACQUIRE_TIMEOUT_VAR: &str = "DEVEVENTS_DB_ACQUIRE_TIMEOUT_SECS";

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Absent until configured; checked on the first connection attempt.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    /// Read configuration from process environment variables.
    ///
    /// A missing `DATABASE_URL` is not an error here; it surfaces as a
    /// configuration error when a connection is first requested.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup(DATABASE_URL_VAR).filter(|v| !v.trim().is_empty());
        let max_connections = parse_or_default(
            MAX_CONNECTIONS_VAR,
            lookup(MAX_CONNECTIONS_VAR),
            DEFAULT_MAX_CONNECTIONS,
        );
        let acquire_timeout_secs = parse_or_default(
            ACQUIRE_TIMEOUT_VAR,
            lookup(ACQUIRE_TIMEOUT_VAR),
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        );

        Self {
            url,
            max_connections,
            acquire_timeout_secs,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = %default, "ignoring malformed setting");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = DatabaseConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DatabaseConfig::default());
        assert!(config.url.is_none());
    }

    #[test]
    fn reads_all_settings() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "postgres://localhost/devevents"),
            (MAX_CONNECTIONS_VAR, "12"),
            (ACQUIRE_TIMEOUT_VAR, "30"),
        ]));
        assert_eq!(config.url.as_deref(), Some("postgres://localhost/devevents"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn blank_url_counts_as_missing() {
        let config = DatabaseConfig::from_lookup(lookup(&[(DATABASE_URL_VAR, "  ")]));
        assert!(config.url.is_none());
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config = DatabaseConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "lots")]));
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }
}
