//! Records Rodrigo hands to the UI. Every field comes from free model text,
//! so everything except the primary name/title is optional.
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::assistant::protocol::{
    artist_labels, bolo_labels, event_labels, render_block, BlockFields, BlockKind,
};

/// An artist suggested to an organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRecommendation {
    pub name: String,
    /// Solo, dúo, banda, DJ...
    pub format: Option<String>,
    pub style: Option<String>,
    pub why_it_fits: Option<String>,
    pub price_range: Option<String>,
    /// Profile path or URL.
    pub link: Option<String>,
}

impl ArtistRecommendation {
    /// Builds the record from a parsed block. `None` when the name is missing.
    pub fn from_fields(mut fields: BlockFields) -> Option<Self> {
        Some(Self {
            name: fields.take(artist_labels::NAME)?,
            format: fields.take(artist_labels::FORMAT),
            style: fields.take(artist_labels::STYLE),
            why_it_fits: fields.take(artist_labels::WHY_IT_FITS),
            price_range: fields.take(artist_labels::PRICE_RANGE),
            link: fields.take(artist_labels::LINK),
        })
    }

    pub fn to_block(&self) -> String {
        render_block(
            BlockKind::Artist,
            &[
                (artist_labels::NAME, Some(self.name.as_str())),
                (artist_labels::FORMAT, self.format.as_deref()),
                (artist_labels::STYLE, self.style.as_deref()),
                (artist_labels::WHY_IT_FITS, self.why_it_fits.as_deref()),
                (artist_labels::PRICE_RANGE, self.price_range.as_deref()),
                (artist_labels::LINK, self.link.as_deref()),
            ],
        )
    }
}

/// A paid gig suggested to an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoloOpportunity {
    pub title: String,
    /// Free text, not guaranteed to be a calendar date.
    pub date: Option<String>,
    pub location: Option<String>,
    pub sought_format: Option<String>,
    pub fee_range: Option<String>,
    pub link: Option<String>,
}

impl BoloOpportunity {
    pub fn from_fields(mut fields: BlockFields) -> Option<Self> {
        Some(Self {
            title: fields.take(bolo_labels::TITLE)?,
            date: fields.take(bolo_labels::DATE),
            location: fields.take(bolo_labels::LOCATION),
            sought_format: fields.take(bolo_labels::SOUGHT_FORMAT),
            fee_range: fields.take(bolo_labels::FEE_RANGE),
            link: fields.take(bolo_labels::LINK),
        })
    }

    pub fn to_block(&self) -> String {
        render_block(
            BlockKind::Bolo,
            &[
                (bolo_labels::TITLE, Some(self.title.as_str())),
                (bolo_labels::DATE, self.date.as_deref()),
                (bolo_labels::LOCATION, self.location.as_deref()),
                (bolo_labels::SOUGHT_FORMAT, self.sought_format.as_deref()),
                (bolo_labels::FEE_RANGE, self.fee_range.as_deref()),
                (bolo_labels::LINK, self.link.as_deref()),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Gig,
    Jam,
    Session,
}

impl EventCategory {
    /// Maps the model's free-text `Tipo` onto the closed set. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_end_matches('.').to_lowercase().as_str() {
            "gig" | "bolo" | "concierto" => Some(EventCategory::Gig),
            "jam" | "jam session" => Some(EventCategory::Jam),
            "session" | "sesión" | "sesion" => Some(EventCategory::Session),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Gig => "gig",
            EventCategory::Jam => "jam",
            EventCategory::Session => "session",
        }
    }
}

/// Pre-filled payload for the event publishing form. Passed through as extracted;
/// the form owns validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub budget: Option<String>,
}

impl EventDraft {
    pub fn from_fields(mut fields: BlockFields) -> Option<Self> {
        Some(Self {
            title: fields.take(event_labels::TITLE)?,
            date: fields.take(event_labels::DATE),
            time: fields.take(event_labels::TIME),
            location: fields.take(event_labels::LOCATION),
            description: fields.take(event_labels::DESCRIPTION),
            category: fields
                .take(event_labels::CATEGORY)
                .and_then(|raw| EventCategory::parse(&raw)),
            genres: fields
                .take(event_labels::GENRES)
                .map(|raw| split_genres(&raw))
                .unwrap_or_default(),
            budget: fields.take(event_labels::BUDGET),
        })
    }

    pub fn to_block(&self) -> String {
        let genres = (!self.genres.is_empty()).then(|| self.genres.join(", "));
        render_block(
            BlockKind::PublishEvent,
            &[
                (event_labels::TITLE, Some(self.title.as_str())),
                (event_labels::DATE, self.date.as_deref()),
                (event_labels::TIME, self.time.as_deref()),
                (event_labels::LOCATION, self.location.as_deref()),
                (event_labels::DESCRIPTION, self.description.as_deref()),
                (event_labels::CATEGORY, self.category.map(EventCategory::as_str)),
                (event_labels::GENRES, genres.as_deref()),
                (event_labels::BUDGET, self.budget.as_deref()),
            ],
        )
    }
}

fn split_genres(raw: &str) -> Vec<String> {
    raw.split([',', ';', '/'])
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// One assistant turn as shown to the UI.
///
/// At most one of the three outcomes is populated: a `publish_event` handoff
/// always comes with empty `artists` and `bolos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedResponse {
    pub text: String,
    pub artists: Vec<ArtistRecommendation>,
    pub bolos: Vec<BoloOpportunity>,
    pub publish_event: Option<EventDraft>,
}

impl ParsedResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn is_handoff(&self) -> bool {
        self.publish_event.is_some()
    }

    /// No text, no records and no handoff.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
            && self.artists.is_empty()
            && self.bolos.is_empty()
            && self.publish_event.is_none()
    }
}
