//! Session queue selection.

use crate::types::{Card, CardStatus, ReviewMode};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Select and order the cards for one session.
///
/// Review mode takes every due card (oldest due date first, unreadable due
/// dates before all others) and tops the queue up with new cards until
/// `daily_limit` is reached. Cram mode takes the whole deck. Either way the
/// presentation order is shuffled with `rng`.
pub fn build_queue<R: Rng + ?Sized>(
    cards: &[Card],
    mode: ReviewMode,
    now: DateTime<Utc>,
    daily_limit: usize,
    rng: &mut R,
) -> Vec<Card> {
    let mut queue = match mode {
        ReviewMode::Cram => cards.to_vec(),
        ReviewMode::Review => select_review(cards, now, daily_limit),
    };
    queue.shuffle(rng);

    tracing::debug!(?mode, deck = cards.len(), queued = queue.len(), "built session queue");
    queue
}

fn select_review(cards: &[Card], now: DateTime<Utc>, daily_limit: usize) -> Vec<Card> {
    let mut due = Vec::new();
    let mut new = Vec::new();
    for card in cards {
        match card.status(now) {
            CardStatus::Due => due.push(card),
            CardStatus::New => new.push(card),
            CardStatus::Scheduled => {}
        }
    }

    // None sorts before Some, so unreadable due dates come first.
    due.sort_by_key(|card| card.metadata.as_ref().and_then(|meta| meta.due_at()));

    let new_slots = daily_limit.saturating_sub(due.len());
    due.into_iter()
        .chain(new.into_iter().take(new_slots))
        .cloned()
        .collect()
}
