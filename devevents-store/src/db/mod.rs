//! Storage boundary - the `Store` trait and its backends
//!
//! # Design Principles
//!
//! - Backends persist already-validated payloads; they never validate fields
//! - Uniqueness is enforced by the backend's indexes, not by check-then-insert
//! - `created_at` is set on insert, `updated_at` on every write

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use devevents_core::{Booking, Event, EventLookup, Mode, NormalizedBooking, NormalizedEvent};
use uuid::Uuid;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Optional filters for listing events (backed by the `{date, mode}` index)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Canonical `YYYY-MM-DD`
    pub date: Option<String>,
    pub mode: Option<Mode>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        self.date.as_ref().map_or(true, |d| *d == event.date)
            && self.mode.map_or(true, |m| m == event.mode)
    }
}

/// Document store for events and bookings
#[async_trait]
pub trait Store: EventLookup {
    async fn insert_event(&self, event: &NormalizedEvent) -> Result<Event, StoreError>;

    async fn update_event(&self, id: Uuid, event: &NormalizedEvent) -> Result<Event, StoreError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError>;

    /// Events ordered by date then time.
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError>;

    async fn insert_booking(&self, booking: &NormalizedBooking) -> Result<Booking, StoreError>;

    async fn update_booking(
        &self,
        id: Uuid,
        booking: &NormalizedBooking,
    ) -> Result<Booking, StoreError>;

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Bookings for one event, newest first.
    async fn bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// Bookings made with one address, newest first.
    async fn bookings_for_email(&self, email: &str) -> Result<Vec<Booking>, StoreError>;
}
