//! Operations exposed to presentation layers.
//!
//! Every call works on the text the store holds right now. Cards are
//! identified by their `order` in a fresh parse; if lines above a card were
//! added or removed since the queue was built, a rating lands on whichever
//! card now has that position.

use crate::algorithm::{RatingPreview, SpacedRepetitionAlgorithm};
use crate::error::StoreError;
use crate::metadata;
use crate::parser::{self, parse};
use crate::store::DocumentStore;
use crate::types::{Card, CardMeta, CardStatus, DeckSummary, Rating};
use chrono::{DateTime, Utc};

/// Parse the current text of a document.
pub async fn load_cards<S>(store: &S, document_id: &str) -> Result<Vec<Card>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let content = store.read_document(document_id).await?;
    Ok(parse(&content))
}

/// Count cards by status.
pub fn summarize(path: &str, name: &str, cards: &[Card], now: DateTime<Utc>) -> DeckSummary {
    let mut summary = DeckSummary {
        path: path.to_string(),
        name: name.to_string(),
        card_count: cards.len(),
        due_count: 0,
        new_count: 0,
    };
    for card in cards {
        match card.status(now) {
            CardStatus::New => summary.new_count += 1,
            CardStatus::Due => summary.due_count += 1,
            CardStatus::Scheduled => {}
        }
    }
    summary
}

/// Summaries of every deck the store knows, sorted by name.
pub async fn list_decks<S>(store: &S, now: DateTime<Utc>) -> Result<Vec<DeckSummary>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let mut decks = Vec::new();
    for document in store.list_documents().await? {
        let cards = load_cards(store, &document.id).await?;
        decks.push(summarize(&document.id, &document.name, &cards, now));
    }
    decks.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(decks)
}

/// Interval each rating would give the card, without changing anything.
pub fn preview<A>(scheduler: &A, card: &Card, now: DateTime<Utc>) -> RatingPreview
where
    A: SpacedRepetitionAlgorithm + ?Sized,
{
    scheduler.preview(card.state().as_ref(), now)
}

/// Rate the card at position `card_order` and persist its new memory state.
///
/// Returns `Ok(None)` without writing when the document no longer has a card
/// at that position.
pub async fn apply_rating<S, A>(
    store: &S,
    scheduler: &A,
    document_id: &str,
    card_order: usize,
    rating: Rating,
    now: DateTime<Utc>,
) -> Result<Option<CardMeta>, StoreError>
where
    S: DocumentStore + ?Sized,
    A: SpacedRepetitionAlgorithm + ?Sized,
{
    let content = store.read_document(document_id).await?;
    let Some(card) = parse(&content).into_iter().find(|card| card.order == card_order) else {
        tracing::warn!(%document_id, card_order, "card not found, rating skipped");
        return Ok(None);
    };

    let result = scheduler.schedule(card.state().as_ref(), rating, now);
    let marker = metadata::encode(&result.meta);
    let patched = parser::patch_metadata(&content, card.question_line, card.meta_line, &marker);

    store.write_document(document_id, &patched).await?;

    tracing::info!(
        %document_id,
        card_order,
        %rating,
        algorithm = scheduler.name(),
        interval_days = result.interval_days,
        reviews = result.meta.reviews,
        "rating applied"
    );
    Ok(Some(result.meta))
}
