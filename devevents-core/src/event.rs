//! Event documents: shapes, field rules, and the pre-commit normalizer

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::{normalize_date, normalize_time};
use crate::slug::slugify;
use crate::validation::{
    non_empty_list, required, required_max, run_rules, Rule, ValidationError, ValidationErrors,
};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_OVERVIEW_LEN: usize = 500;

/// How attendees take part in an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Online,
    Offline,
    Hybrid,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ValidationError::InvalidVariant {
                field: "mode",
                value: other.to_owned(),
            }),
        }
    }
}

/// Caller-supplied candidate state of an event.
///
/// Everything is free text; missing JSON fields default to empty and are
/// reported as `Empty` violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

/// Validated write payload for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: Mode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

/// Committed event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: Mode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Attach identity and timestamps to a normalized payload.
    pub fn from_normalized(
        id: Uuid,
        fields: NormalizedEvent,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: fields.title,
            slug: fields.slug,
            description: fields.description,
            overview: fields.overview,
            image: fields.image,
            venue: fields.venue,
            location: fields.location,
            date: fields.date,
            time: fields.time,
            mode: fields.mode,
            audience: fields.audience,
            agenda: fields.agenda,
            organizer: fields.organizer,
            tags: fields.tags,
            created_at,
            updated_at,
        }
    }
}

const EVENT_RULES: &[Rule<EventDraft>] = &[
    Rule {
        field: "title",
        check: |e| required_max("title", &e.title, MAX_TITLE_LEN),
    },
    Rule {
        field: "description",
        check: |e| required_max("description", &e.description, MAX_DESCRIPTION_LEN),
    },
    Rule {
        field: "overview",
        check: |e| required_max("overview", &e.overview, MAX_OVERVIEW_LEN),
    },
    Rule {
        field: "image",
        check: |e| required("image", &e.image),
    },
    Rule {
        field: "venue",
        check: |e| required("venue", &e.venue),
    },
    Rule {
        field: "location",
        check: |e| required("location", &e.location),
    },
    Rule {
        field: "date",
        check: |e| required("date", &e.date),
    },
    Rule {
        field: "time",
        check: |e| required("time", &e.time),
    },
    Rule {
        field: "mode",
        check: |e| {
            required("mode", &e.mode)?;
            e.mode.parse::<Mode>().map(|_| ())
        },
    },
    Rule {
        field: "audience",
        check: |e| required("audience", &e.audience),
    },
    Rule {
        field: "agenda",
        check: |e| non_empty_list("agenda", &e.agenda),
    },
    Rule {
        field: "organizer",
        check: |e| required("organizer", &e.organizer),
    },
    Rule {
        field: "tags",
        check: |e| non_empty_list("tags", &e.tags),
    },
];

fn clean_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Validate a candidate event and produce its normalized write payload.
///
/// `previous` is the committed record being replaced, or `None` on create.
/// The slug is re-derived when the record is new or the trimmed title
/// changed; `date` and `time` are normalized when new or changed, and kept
/// verbatim otherwise since stored values are already canonical. All
/// violations are collected and returned together; nothing is written when
/// any are found.
pub fn validate_and_normalize(
    previous: Option<&Event>,
    candidate: EventDraft,
) -> Result<NormalizedEvent, ValidationErrors> {
    let mut errors = run_rules(&candidate, EVENT_RULES);

    let title = candidate.title.trim().to_owned();
    let slug = match previous {
        Some(prev) if prev.title == title => prev.slug.clone(),
        _ => {
            let slug = slugify(&title);
            tracing::debug!(%title, %slug, "derived slug");
            if slug.is_empty() && !title.is_empty() {
                errors.push(ValidationError::InvalidFormat {
                    field: "title",
                    reason: "must contain at least one ASCII letter or digit",
                });
            }
            slug
        }
    };

    let date = match previous {
        Some(prev) if prev.date == candidate.date => prev.date.clone(),
        _ if candidate.date.trim().is_empty() => String::new(),
        _ => normalize_date(&candidate.date).unwrap_or_else(|e| {
            errors.push(e);
            String::new()
        }),
    };

    let time = match previous {
        Some(prev) if prev.time == candidate.time => prev.time.clone(),
        _ if candidate.time.trim().is_empty() => String::new(),
        _ => normalize_time(&candidate.time).unwrap_or_else(|e| {
            errors.push(e);
            String::new()
        }),
    };

    if let Some(errors) = ValidationErrors::from_vec(errors) {
        tracing::debug!(%errors, "event rejected");
        return Err(errors);
    }

    // The mode rule has already accepted this value.
    let mode = candidate.mode.parse::<Mode>()?;

    Ok(NormalizedEvent {
        title,
        slug,
        description: candidate.description.trim().to_owned(),
        overview: candidate.overview.trim().to_owned(),
        image: candidate.image.trim().to_owned(),
        venue: candidate.venue.trim().to_owned(),
        location: candidate.location.trim().to_owned(),
        date,
        time,
        mode,
        audience: candidate.audience.trim().to_owned(),
        agenda: clean_items(candidate.agenda),
        organizer: candidate.organizer.trim().to_owned(),
        tags: clean_items(candidate.tags),
    })
}
