//! In-memory store.
//!
//! Enforces the same unique indexes as the PostgreSQL schema so the
//! validated-save pipeline behaves identically without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use devevents_core::{Booking, Event, EventLookup, LookupError, NormalizedBooking, NormalizedEvent};
use uuid::Uuid;

use super::{EventFilter, Store};
use crate::error::StoreError;
use crate::schema::{BOOKING_EVENT_EMAIL_UNIQUE, EVENT_SLUG_UNIQUE};

#[derive(Debug, Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    /// Insertion order, oldest first
    bookings: Vec<Booking>,
}

impl Inner {
    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.events
            .values()
            .any(|e| e.slug == slug && Some(e.id) != except)
    }

    fn booking_taken(&self, booking: &NormalizedBooking, except: Option<Uuid>) -> bool {
        self.bookings.iter().any(|b| {
            b.event_id == booking.event_id && b.email == booking.email && Some(b.id) != except
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn slug_violation() -> StoreError {
    StoreError::UniqueViolation {
        entity: "event",
        constraint: EVENT_SLUG_UNIQUE.to_owned(),
    }
}

fn booking_violation() -> StoreError {
    StoreError::UniqueViolation {
        entity: "booking",
        constraint: BOOKING_EVENT_EMAIL_UNIQUE.to_owned(),
    }
}

fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    // Reverse first so equal timestamps keep newest-inserted on top.
    bookings.reverse();
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    bookings
}

#[async_trait]
impl EventLookup for MemoryStore {
    async fn event_exists(&self, id: Uuid) -> Result<bool, LookupError> {
        Ok(self.lock()?.events.contains_key(&id))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_event(&self, event: &NormalizedEvent) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;
        if inner.slug_taken(&event.slug, None) {
            return Err(slug_violation());
        }

        let now = Utc::now();
        let record = Event::from_normalized(Uuid::new_v4(), event.clone(), now, now);
        inner.events.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_event(&self, id: Uuid, event: &NormalizedEvent) -> Result<Event, StoreError> {
        let mut inner = self.lock()?;
        let created_at = inner
            .events
            .get(&id)
            .map(|e| e.created_at)
            .ok_or_else(|| StoreError::NotFound {
                resource: "event",
                id: id.to_string(),
            })?;
        if inner.slug_taken(&event.slug, Some(id)) {
            return Err(slug_violation());
        }

        let record = Event::from_normalized(id, event.clone(), created_at, Utc::now());
        inner.events.insert(id, record.clone());
        Ok(record)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.lock()?.events.values().find(|e| e.slug == slug).cloned())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .lock()?
            .events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
        Ok(events)
    }

    async fn insert_booking(&self, booking: &NormalizedBooking) -> Result<Booking, StoreError> {
        let mut inner = self.lock()?;
        if inner.booking_taken(booking, None) {
            return Err(booking_violation());
        }

        let now = Utc::now();
        let record = Booking {
            id: Uuid::new_v4(),
            event_id: booking.event_id,
            email: booking.email.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.bookings.push(record.clone());
        Ok(record)
    }

    async fn update_booking(
        &self,
        id: Uuid,
        booking: &NormalizedBooking,
    ) -> Result<Booking, StoreError> {
        let mut inner = self.lock()?;
        if inner.booking_taken(booking, Some(id)) {
            return Err(booking_violation());
        }

        let record = inner
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound {
                resource: "booking",
                id: id.to_string(),
            })?;
        record.event_id = booking.event_id;
        record.email = booking.email.clone();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.lock()?.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let matching = self
            .lock()?
            .bookings
            .iter()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn bookings_for_email(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let matching = self
            .lock()?
            .bookings
            .iter()
            .filter(|b| b.email == email)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devevents_core::Mode;

    fn event(slug: &str, date: &str, mode: Mode) -> NormalizedEvent {
        NormalizedEvent {
            title: slug.replace('-', " "),
            slug: slug.into(),
            description: "d".into(),
            overview: "o".into(),
            image: "/i.png".into(),
            venue: "v".into(),
            location: "l".into(),
            date: date.into(),
            time: "09:00".into(),
            mode,
            audience: "a".into(),
            agenda: vec!["x".into()],
            organizer: "org".into(),
            tags: vec!["t".into()],
        }
    }

    #[tokio::test]
    async fn slug_is_unique() {
        let store = MemoryStore::new();
        store
            .insert_event(&event("devops-days", "2024-03-22", Mode::Offline))
            .await
            .unwrap();
        let err = store
            .insert_event(&event("devops-days", "2024-03-23", Mode::Online))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { entity: "event", .. }));
    }

    #[tokio::test]
    async fn update_may_keep_own_slug_but_not_take_another() {
        let store = MemoryStore::new();
        let a = store
            .insert_event(&event("alpha", "2024-01-01", Mode::Online))
            .await
            .unwrap();
        store
            .insert_event(&event("beta", "2024-01-02", Mode::Online))
            .await
            .unwrap();

        let same = store
            .update_event(a.id, &event("alpha", "2024-01-05", Mode::Online))
            .await
            .unwrap();
        assert_eq!(same.created_at, a.created_at);
        assert_eq!(same.date, "2024-01-05");
        assert!(same.updated_at >= a.updated_at);

        let err = store
            .update_event(a.id, &event("beta", "2024-01-05", Mode::Online))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn update_missing_event_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_event(Uuid::new_v4(), &event("gone", "2024-01-01", Mode::Online))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { resource: "event", .. }));
    }

    #[tokio::test]
    async fn list_filters_by_date_and_mode() {
        let store = MemoryStore::new();
        for (slug, date, mode) in [
            ("b", "2024-02-10", Mode::Online),
            ("a", "2024-01-15", Mode::Offline),
            ("c", "2024-02-10", Mode::Hybrid),
        ] {
            store.insert_event(&event(slug, date, mode)).await.unwrap();
        }

        let all = store.list_events(&EventFilter::default()).await.unwrap();
        let slugs: Vec<_> = all.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs[0], "a");
        assert_eq!(all.len(), 3);

        let filter = EventFilter {
            date: Some("2024-02-10".into()),
            mode: Some(Mode::Hybrid),
        };
        let hybrid = store.list_events(&filter).await.unwrap();
        assert_eq!(hybrid.len(), 1);
        assert_eq!(hybrid[0].slug, "c");
    }

    #[tokio::test]
    async fn booking_pair_is_unique() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();
        let booking = NormalizedBooking {
            event_id,
            email: "a@b.co".into(),
        };
        store.insert_booking(&booking).await.unwrap();
        let err = store.insert_booking(&booking).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { entity: "booking", .. }));

        // Same email on another event is fine.
        let other = NormalizedBooking {
            event_id: Uuid::new_v4(),
            email: "a@b.co".into(),
        };
        store.insert_booking(&other).await.unwrap();
        assert_eq!(store.bookings_for_email("a@b.co").await.unwrap().len(), 2);
        assert_eq!(store.bookings_for_event(event_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bookings_newest_first() {
        let store = MemoryStore::new();
        let event_id = Uuid::new_v4();
        let mut ids = Vec::new();
        for email in ["1@x.io", "2@x.io", "3@x.io"] {
            let booking = NormalizedBooking {
                event_id,
                email: email.into(),
            };
            ids.push(store.insert_booking(&booking).await.unwrap().id);
        }

        let listed: Vec<_> = store
            .bookings_for_event(event_id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        ids.reverse();
        assert_eq!(listed, ids);
    }
}
