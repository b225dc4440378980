//! devevents-core: document rules for the developer-events listing
//!
//! Pure validation and normalization for Event and Booking records. Storage
//! and connection handling live in `devevents-store`.

pub mod booking;
pub mod datetime;
pub mod event;
pub mod slug;
pub mod validation;

pub use booking::{
    validate_booking, Booking, BookingDraft, EventLookup, LookupError, NormalizedBooking,
};
pub use datetime::{normalize_date, normalize_time};
pub use event::{validate_and_normalize, Event, EventDraft, Mode, NormalizedEvent};
pub use slug::slugify;
pub use validation::{Rule, ValidationError, ValidationErrors};
