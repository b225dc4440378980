//! Booking documents and the referential pre-commit check

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{required, run_rules, Rule, ValidationError, ValidationErrors};

/// RFC 5322-derived address pattern
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("invalid email regex")
});

/// Error returned by an [`EventLookup`] implementation
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Existence check for the event a booking points at.
#[async_trait]
pub trait EventLookup: Send + Sync {
    async fn event_exists(&self, id: Uuid) -> Result<bool, LookupError>;
}

/// Caller-supplied candidate state of a booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingDraft {
    pub event_id: String,
    pub email: String,
}

/// Validated write payload for a booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBooking {
    pub event_id: Uuid,
    pub email: String,
}

/// Committed booking record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trim and lowercase an address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

const BOOKING_RULES: &[Rule<BookingDraft>] = &[
    Rule {
        field: "eventId",
        check: |b| required("eventId", &b.event_id),
    },
    Rule {
        field: "email",
        check: |b| {
            required("email", &b.email)?;
            if !is_valid_email(&normalize_email(&b.email)) {
                return Err(ValidationError::InvalidFormat {
                    field: "email",
                    reason: "invalid email",
                });
            }
            Ok(())
        },
    },
];

/// Validate a candidate booking and produce its write payload.
///
/// Field rules run first; if any fail the event lookup is skipped. The
/// referential check only runs for new bookings or when `eventId` changed.
/// A missing event and a failed lookup are reported as different
/// violations. The referenced event is never modified.
pub async fn validate_booking<L>(
    previous: Option<&Booking>,
    candidate: BookingDraft,
    events: &L,
) -> Result<NormalizedBooking, ValidationErrors>
where
    L: EventLookup + ?Sized,
{
    if let Some(errors) = ValidationErrors::from_vec(run_rules(&candidate, BOOKING_RULES)) {
        return Err(errors);
    }

    let raw_id = candidate.event_id.trim();
    let email = normalize_email(&candidate.email);

    let event_id = match (previous, Uuid::parse_str(raw_id)) {
        (Some(prev), Ok(id)) if prev.event_id == id => {
            tracing::debug!(%id, "eventId unchanged, skipping reference check");
            id
        }
        (_, Ok(id)) => {
            check_reference(events, raw_id, id).await?;
            id
        }
        (_, Err(e)) => {
            return Err(ValidationError::ReferenceLookup {
                field: "eventId",
                id: raw_id.to_owned(),
                reason: format!("invalid event id format: {e}"),
            }
            .into());
        }
    };

    Ok(NormalizedBooking { event_id, email })
}

async fn check_reference<L>(events: &L, raw_id: &str, id: Uuid) -> Result<(), ValidationError>
where
    L: EventLookup + ?Sized,
{
    match events.event_exists(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ValidationError::MissingReference {
            field: "eventId",
            id: raw_id.to_owned(),
        }),
        Err(e) => {
            tracing::warn!(%id, error = %e, "event lookup failed");
            Err(ValidationError::ReferenceLookup {
                field: "eventId",
                id: raw_id.to_owned(),
                reason: e.to_string(),
            })
        }
    }
}
