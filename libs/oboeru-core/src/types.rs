//! Core types for the flashcard engine.

use crate::error::SettingsError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Schema version written into every metadata marker.
pub const META_VERSION: u8 = 1;

/// Algorithm tag written into every metadata marker.
pub const ALGORITHM: &str = "fsrs-6";

/// Rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// All ratings, weakest first.
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("rating out of range: {value}"))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.to_value()
    }
}

impl FromStr for Rating {
    type Err = String;

    /// Accepts either the rating name or its numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<u8>() {
            return Self::try_from(value);
        }
        Self::ALL
            .into_iter()
            .find(|rating| rating.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown rating: {s}"))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source shape of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFormat {
    /// `question :: answer` on one line.
    Single,
    /// Header line, `?`, answer lines, `+++`.
    Multi,
}

/// Memory state persisted inline next to a card.
///
/// Timestamps are kept as written so that a marker decodes and re-encodes to
/// the same text; use [`CardMeta::reviewed_at`] and [`CardMeta::due_at`] for
/// the parsed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMeta {
    pub v: u8,
    pub algo: String,
    #[serde(rename = "reviewedAt")]
    pub reviewed_at_raw: String,
    #[serde(rename = "dueAt")]
    pub due_at_raw: String,
    #[serde(serialize_with = "serialize_number")]
    pub s: f64,
    #[serde(serialize_with = "serialize_number")]
    pub d: f64,
    pub rating: Rating,
    pub reviews: u32,
    pub lapses: u32,
}

impl CardMeta {
    /// Build a record for the supported schema and algorithm.
    pub fn new(
        reviewed_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
        s: f64,
        d: f64,
        rating: Rating,
        reviews: u32,
        lapses: u32,
    ) -> Self {
        Self {
            v: META_VERSION,
            algo: ALGORITHM.to_string(),
            reviewed_at_raw: format_timestamp(reviewed_at),
            due_at_raw: format_timestamp(due_at),
            s,
            d,
            rating,
            reviews,
            lapses,
        }
    }

    /// Whether the record may take part in scheduling.
    ///
    /// Anything else is treated exactly like a card that was never reviewed.
    pub fn is_well_formed(&self) -> bool {
        self.v == META_VERSION
            && self.algo == ALGORITHM
            && !self.reviewed_at_raw.trim().is_empty()
            && !self.due_at_raw.trim().is_empty()
            && self.s.is_finite()
            && self.s > 0.0
            && self.d.is_finite()
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.reviewed_at_raw)
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.due_at_raw)
    }

    /// Scheduler input derived from this record.
    ///
    /// Returns `None` when the review timestamp cannot be read, which sends
    /// the card down the new-card path.
    pub fn to_state(&self) -> Option<CardState> {
        Some(CardState {
            s: self.s,
            d: self.d,
            last_review: self.reviewed_at()?,
            reviews: self.reviews,
            lapses: self.lapses,
        })
    }
}

/// Integral values are written without a fractional part (`3`, not `3.0`).
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Subset of [`CardMeta`] the scheduler needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardState {
    pub s: f64,
    pub d: f64,
    pub last_review: DateTime<Utc>,
    pub reviews: u32,
    pub lapses: u32,
}

/// Where a card stands relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// No well-formed metadata.
    New,
    /// Due date reached, or unreadable.
    Due,
    /// Reviewed and not yet due.
    Scheduled,
}

/// Card parsed from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// 0-based position among the cards of the document at parse time.
    pub order: usize,
    pub format: CardFormat,
    pub question: String,
    pub answer: String,
    pub question_line: usize,
    pub meta_line: Option<usize>,
    pub metadata: Option<CardMeta>,
}

impl Card {
    pub fn status(&self, now: DateTime<Utc>) -> CardStatus {
        match &self.metadata {
            None => CardStatus::New,
            Some(meta) => match meta.due_at() {
                Some(due) if due > now => CardStatus::Scheduled,
                _ => CardStatus::Due,
            },
        }
    }

    /// Scheduler input, if the card has usable memory state.
    pub fn state(&self) -> Option<CardState> {
        self.metadata.as_ref().and_then(CardMeta::to_state)
    }
}

/// Deck with card counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSummary {
    pub path: String,
    pub name: String,
    pub card_count: usize,
    pub due_count: usize,
    pub new_count: usize,
}

/// Session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// Due cards plus new cards up to the daily limit.
    #[default]
    Review,
    /// Every card, no filtering, nothing persisted.
    Cram,
}

/// User-tunable scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub request_retention: f64,
    pub maximum_interval: u32,
    pub daily_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: 36500,
            daily_limit: 20,
        }
    }
}

impl Settings {
    pub const MIN_RETENTION: f64 = 0.7;
    pub const MAX_RETENTION: f64 = 0.97;
    /// Longest interval in days; keeps every due date inside the timestamp range.
    pub const MAX_INTERVAL: u32 = 36500;

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(Self::MIN_RETENTION..=Self::MAX_RETENTION).contains(&self.request_retention) {
            return Err(SettingsError::RetentionOutOfRange(self.request_retention));
        }
        if !(1..=Self::MAX_INTERVAL).contains(&self.maximum_interval) {
            return Err(SettingsError::InvalidMaximumInterval);
        }
        if self.daily_limit == 0 {
            return Err(SettingsError::InvalidDailyLimit);
        }
        Ok(())
    }

    /// Update one setting by name, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let mut next = self.clone();
        match key {
            "request_retention" => next.request_retention = value.trim().parse().map_err(|_| invalid())?,
            "maximum_interval" => next.maximum_interval = value.trim().parse().map_err(|_| invalid())?,
            "daily_limit" => next.daily_limit = value.trim().parse().map_err(|_| invalid())?,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}
