//! Validated-save pipeline
//!
//! Every create or update goes through the entity's validator before the
//! store sees it. Updates load the committed record first and hand both
//! states to the validator, which decides what needs re-deriving.

use devevents_core::booking::normalize_email;
use devevents_core::{
    normalize_date, validate_and_normalize, validate_booking, Booking, BookingDraft, Event,
    EventDraft, ValidationErrors,
};
use uuid::Uuid;

use crate::db::{EventFilter, Store};
use crate::error::{Error, Result};

/// Entry point for reading and writing events and bookings
#[derive(Debug, Clone)]
pub struct Records<S> {
    store: S,
}

impl<S: Store> Records<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and insert a new event.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        let normalized = validate_and_normalize(None, draft).map_err(|e| {
            tracing::warn!(error = %e, "event create rejected");
            e
        })?;
        let event = self.store.insert_event(&normalized).await?;
        tracing::info!(id = %event.id, slug = %event.slug, "event created");
        Ok(event)
    }

    /// Validate and replace an existing event.
    pub async fn update_event(&self, id: Uuid, draft: EventDraft) -> Result<Event> {
        let previous = self.event(id).await?;
        let normalized = validate_and_normalize(Some(&previous), draft).map_err(|e| {
            tracing::warn!(%id, error = %e, "event update rejected");
            e
        })?;
        let event = self.store.update_event(id, &normalized).await?;
        tracing::info!(%id, slug = %event.slug, "event updated");
        Ok(event)
    }

    pub async fn event(&self, id: Uuid) -> Result<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "event",
                id: id.to_string(),
            })
    }

    pub async fn event_by_slug(&self, slug: &str) -> Result<Event> {
        self.store
            .find_event_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "event",
                id: slug.to_owned(),
            })
    }

    /// List events; a date filter accepts any supported date spelling.
    pub async fn list_events(&self, mut filter: EventFilter) -> Result<Vec<Event>> {
        if let Some(date) = filter.date.take() {
            filter.date = Some(normalize_date(&date).map_err(ValidationErrors::from)?);
        }
        Ok(self.store.list_events(&filter).await?)
    }

    /// Validate (including the event reference) and insert a new booking.
    pub async fn create_booking(&self, draft: BookingDraft) -> Result<Booking> {
        let normalized = validate_booking(None, draft, &self.store)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "booking create rejected");
                e
            })?;
        let booking = self.store.insert_booking(&normalized).await?;
        tracing::info!(id = %booking.id, event_id = %booking.event_id, "booking created");
        Ok(booking)
    }

    /// Validate and replace an existing booking.
    pub async fn update_booking(&self, id: Uuid, draft: BookingDraft) -> Result<Booking> {
        let previous = self.booking(id).await?;
        let normalized = validate_booking(Some(&previous), draft, &self.store)
            .await
            .map_err(|e| {
                tracing::warn!(%id, error = %e, "booking update rejected");
                e
            })?;
        let booking = self.store.update_booking(id, &normalized).await?;
        tracing::info!(%id, event_id = %booking.event_id, "booking updated");
        Ok(booking)
    }

    pub async fn booking(&self, id: Uuid) -> Result<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "booking",
                id: id.to_string(),
            })
    }

    pub async fn bookings_for_event(&self, event_id: Uuid) -> Result<Vec<Booking>> {
        Ok(self.store.bookings_for_event(event_id).await?)
    }

    pub async fn bookings_for_email(&self, email: &str) -> Result<Vec<Booking>> {
        Ok(self.store.bookings_for_email(&normalize_email(email)).await?)
    }
}
