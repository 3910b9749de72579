//! Command implementations.

pub mod deck;
pub mod settings;
pub mod study;

use chrono::{DateTime, Utc};
use oboeru_core::{Card, CardStatus};

/// Short status text for listings.
pub(crate) fn status_label(card: &Card, now: DateTime<Utc>) -> String {
    match card.status(now) {
        CardStatus::New => "new".to_string(),
        CardStatus::Due => "due".to_string(),
        CardStatus::Scheduled => card
            .metadata
            .as_ref()
            .and_then(|meta| meta.due_at())
            .map(|due| format!("due {}", due.format("%Y-%m-%d")))
            .unwrap_or_else(|| "scheduled".to_string()),
    }
}

/// First line of a card side, shortened for one-line listings.
pub(crate) fn one_line(text: &str, width: usize) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.chars().count() > width {
        let cut: String = first.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    } else {
        first.to_string()
    }
}
