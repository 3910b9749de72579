//! Spaced repetition algorithm implementations.

pub mod fsrs;

use crate::types::{CardMeta, CardState, Rating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    /// Record to persist next to the card.
    pub meta: CardMeta,
    pub interval_days: u32,
    pub next_due: DateTime<Utc>,
}

/// Interval in days each rating would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPreview {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl RatingPreview {
    pub fn get(&self, rating: Rating) -> u32 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier, as written into metadata markers.
    fn name(&self) -> &'static str;

    /// Calculate the next memory state after a review.
    ///
    /// `previous` is `None` for a card that has never been reviewed.
    fn schedule(
        &self,
        previous: Option<&CardState>,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> SchedulingResult;

    /// Intervals for every rating, without committing to any of them.
    fn preview(&self, previous: Option<&CardState>, now: DateTime<Utc>) -> RatingPreview {
        let interval = |rating| self.schedule(previous, rating, now).interval_days;
        RatingPreview {
            again: interval(Rating::Again),
            hard: interval(Rating::Hard),
            good: interval(Rating::Good),
            easy: interval(Rating::Easy),
        }
    }
}
