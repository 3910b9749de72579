//! Deck listing commands.

use super::{one_line, status_label};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use oboeru_core::{list_decks, load_cards, DocumentInfo, DocumentStore, FsStore};

/// Find a deck by document id or by name.
pub async fn resolve_deck(store: &FsStore, deck: &str) -> Result<DocumentInfo> {
    let documents = store.list_documents().await?;
    let found = documents
        .iter()
        .find(|document| document.id == deck)
        .or_else(|| {
            documents
                .iter()
                .find(|document| document.name.eq_ignore_ascii_case(deck))
        });
    match found {
        Some(document) => Ok(document.clone()),
        None => bail!("no deck named {deck} in {}", store.root().display()),
    }
}

/// List all decks.
pub async fn list(store: &FsStore, now: DateTime<Utc>) -> Result<()> {
    let decks = list_decks(store, now).await?;
    if decks.is_empty() {
        println!("No decks found in {}. Tag a note with #flashcards.", store.root().display());
        return Ok(());
    }

    println!("{:<32} {:>6} {:>6} {:>6}", "DECK", "TOTAL", "DUE", "NEW");
    for deck in decks {
        println!(
            "{:<32} {:>6} {:>6} {:>6}",
            one_line(&deck.name, 32),
            deck.card_count,
            deck.due_count,
            deck.new_count
        );
    }
    Ok(())
}

/// List the cards of one deck.
pub async fn cards(store: &FsStore, deck: &str, now: DateTime<Utc>) -> Result<()> {
    let document = resolve_deck(store, deck).await?;
    let cards = load_cards(store, &document.id).await?;

    println!("{} ({} cards)", document.name, cards.len());
    for card in &cards {
        println!(
            "{:>4}  {:<6} {:<16} {}",
            card.order,
            format!("{:?}", card.format).to_lowercase(),
            status_label(card, now),
            one_line(&card.question, 60)
        );
    }
    Ok(())
}
