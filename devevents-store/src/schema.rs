//! Table and index declarations, and the migration that applies them

use sqlx::PgPool;

use crate::error::StoreError;

/// An index the storage layer must maintain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub table: &'static str,
    /// Column list as written in `CREATE INDEX`, including sort order
    pub columns: &'static str,
    pub unique: bool,
}

pub const EVENT_SLUG_UNIQUE: &str = "uniq_event_slug";
pub const BOOKING_EVENT_EMAIL_UNIQUE: &str = "uniq_event_email";

/// Every index the events and bookings collections rely on.
pub const REQUIRED_INDEXES: &[IndexSpec] = &[
    IndexSpec {
        name: EVENT_SLUG_UNIQUE,
        table: "events",
        columns: "slug",
        unique: true,
    },
    IndexSpec {
        name: "idx_events_date_mode",
        table: "events",
        columns: "date, mode",
        unique: false,
    },
    IndexSpec {
        name: "idx_bookings_event",
        table: "bookings",
        columns: "event_id",
        unique: false,
    },
    IndexSpec {
        name: "idx_bookings_event_created",
        table: "bookings",
        columns: "event_id, created_at DESC",
        unique: false,
    },
    IndexSpec {
        name: "idx_bookings_email",
        table: "bookings",
        columns: "email",
        unique: false,
    },
    IndexSpec {
        name: BOOKING_EVENT_EMAIL_UNIQUE,
        table: "bookings",
        columns: "event_id, email",
        unique: true,
    },
];

impl IndexSpec {
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if self.unique { "UNIQUE " } else { "" },
            self.name,
            self.table,
            self.columns
        )
    }
}

/// Create tables and indexes. Safe to run repeatedly.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    tracing::info!("Running devevents migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL CHECK (char_length(title) <= 100),
            slug TEXT NOT NULL CHECK (slug = lower(slug)),
            description TEXT NOT NULL CHECK (char_length(description) <= 1000),
            overview TEXT NOT NULL CHECK (char_length(overview) <= 500),
            image TEXT NOT NULL,
            venue TEXT NOT NULL,
            location TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            mode TEXT NOT NULL CHECK (mode IN ('online', 'offline', 'hybrid')),
            audience TEXT NOT NULL,
            agenda TEXT[] NOT NULL CHECK (cardinality(agenda) > 0),
            organizer TEXT NOT NULL,
            tags TEXT[] NOT NULL CHECK (cardinality(tags) > 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // No foreign key: the event reference is checked at write time only.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            event_id UUID NOT NULL,
            email TEXT NOT NULL CHECK (email = lower(email)),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in REQUIRED_INDEXES {
        sqlx::query(&index.create_sql()).execute(pool).await?;
    }

    tracing::info!("devevents migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_both_unique_indexes() {
        let unique: Vec<_> = REQUIRED_INDEXES
            .iter()
            .filter(|i| i.unique)
            .map(|i| (i.table, i.columns))
            .collect();
        assert_eq!(
            unique,
            vec![("events", "slug"), ("bookings", "event_id, email")]
        );
    }

    #[test]
    fn index_sql() {
        let sql = REQUIRED_INDEXES
            .iter()
            .find(|i| i.name == BOOKING_EVENT_EMAIL_UNIQUE)
            .unwrap()
            .create_sql();
        assert_eq!(
            sql,
            "CREATE UNIQUE INDEX IF NOT EXISTS uniq_event_email ON bookings (event_id, email)"
        );
    }

    #[test]
    fn index_names_are_distinct() {
        let mut names: Vec<_> = REQUIRED_INDEXES.iter().map(|i| i.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), REQUIRED_INDEXES.len());
    }
}
