//! PostgreSQL store
//!
//! Writes rely on the unique indexes declared in `schema` and translate
//! their violations instead of checking first.

use async_trait::async_trait;
use devevents_core::{
    Booking, Event, EventLookup, LookupError, Mode, NormalizedBooking, NormalizedEvent,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{EventFilter, Store};
use crate::error::StoreError;

const EVENT_COLUMNS: &str = "id, title, slug, description, overview, image, venue, location, \
    date, time, mode, audience, agenda, organizer, tags, created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, event_id, email, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let id: Uuid = row.get("id");
    let mode: String = row.get("mode");
    let mode = mode.parse::<Mode>().map_err(|e| StoreError::Corrupt {
        resource: "event",
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Event {
        id,
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        overview: row.get("overview"),
        image: row.get("image"),
        venue: row.get("venue"),
        location: row.get("location"),
        date: row.get("date"),
        time: row.get("time"),
        mode,
        audience: row.get("audience"),
        agenda: row.get("agenda"),
        organizer: row.get("organizer"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn booking_from_row(row: &PgRow) -> Booking {
    Booking {
        id: row.get("id"),
        event_id: row.get("event_id"),
        email: row.get("email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl EventLookup for PgStore {
    async fn event_exists(&self, id: Uuid) -> Result<bool, LookupError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_event(&self, event: &NormalizedEvent) -> Result<Event, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO events
                (id, title, slug, description, overview, image, venue, location,
                 date, time, mode, audience, agenda, organizer, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode.as_str())
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write("event", e))?;

        event_from_row(&row)
    }

    async fn update_event(&self, id: Uuid, event: &NormalizedEvent) -> Result<Event, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE events SET
                title = $2, slug = $3, description = $4, overview = $5, image = $6,
                venue = $7, location = $8, date = $9, time = $10, mode = $11,
                audience = $12, agenda = $13, organizer = $14, tags = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode.as_str())
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_write("event", e))?
        .ok_or_else(|| StoreError::NotFound {
            resource: "event",
            id: id.to_string(),
        })?;

        event_from_row(&row)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(event_from_row)
            .transpose()
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(event_from_row)
            .transpose()
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE ($1::text IS NULL OR date = $1)
              AND ($2::text IS NULL OR mode = $2)
            ORDER BY date ASC, time ASC
            "#
        ))
        .bind(filter.date.as_deref())
        .bind(filter.mode.map(|m| m.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn insert_booking(&self, booking: &NormalizedBooking) -> Result<Booking, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (id, event_id, email)
            VALUES ($1, $2, $3)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(booking.event_id)
        .bind(&booking.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write("booking", e))?;

        Ok(booking_from_row(&row))
    }

    async fn update_booking(
        &self,
        id: Uuid,
        booking: &NormalizedBooking,
    ) -> Result<Booking, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings SET event_id = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(booking.event_id)
        .bind(&booking.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_write("booking", e))?
        .ok_or_else(|| StoreError::NotFound {
            resource: "booking",
            id: id.to_string(),
        })?;

        Ok(booking_from_row(&row))
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(booking_from_row))
    }

    async fn bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 ORDER BY created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(booking_from_row).collect())
    }

    async fn bookings_for_email(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE email = $1 ORDER BY created_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(booking_from_row).collect())
    }
}
