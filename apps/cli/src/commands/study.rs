//! Study session commands.

use super::deck::resolve_deck;
use super::{one_line, status_label};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use oboeru_core::{
    apply_rating, build_queue, load_cards, preview, Card, DocumentStore, Fsrs, Rating,
    RatingPreview, ReviewMode, Settings,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn format_preview(intervals: &RatingPreview) -> String {
    Rating::ALL
        .iter()
        .map(|&rating| {
            format!(
                "{}) {} {}d",
                rating.to_value(),
                rating,
                intervals.get(rating)
            )
        })
        .collect::<Vec<_>>()
        .join("   ")
}

async fn deck_cards(store: &impl DocumentStore, deck_id: &str) -> Result<Vec<Card>> {
    load_cards(store, deck_id)
        .await
        .with_context(|| format!("failed to load {deck_id}"))
}

/// Print the session queue for a deck.
pub async fn queue(
    store: &oboeru_core::FsStore,
    settings: &Settings,
    deck: &str,
    mode: ReviewMode,
    seed: Option<u64>,
    now: DateTime<Utc>,
) -> Result<()> {
    let document = resolve_deck(store, deck).await?;
    let cards = deck_cards(store, &document.id).await?;
    let queue = build_queue(
        &cards,
        mode,
        now,
        settings.daily_limit as usize,
        &mut session_rng(seed),
    );

    println!("{} cards queued from {}", queue.len(), document.name);
    for card in &queue {
        println!(
            "{:>4}  {:<16} {}",
            card.order,
            status_label(card, now),
            one_line(&card.question, 60)
        );
    }
    Ok(())
}

/// Print the interval each rating would give a card.
pub async fn show_preview(
    store: &oboeru_core::FsStore,
    settings: &Settings,
    deck: &str,
    order: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    let document = resolve_deck(store, deck).await?;
    let cards = deck_cards(store, &document.id).await?;
    let Some(card) = cards.iter().find(|card| card.order == order) else {
        println!("No card {order} in {}", document.name);
        return Ok(());
    };

    let fsrs = Fsrs::from_settings(settings);
    println!("{}", one_line(&card.question, 72));
    println!("{}", format_preview(&preview(&fsrs, card, now)));
    Ok(())
}

/// Rate one card and persist the result.
pub async fn rate(
    store: &oboeru_core::FsStore,
    settings: &Settings,
    deck: &str,
    order: usize,
    rating: Rating,
    now: DateTime<Utc>,
) -> Result<()> {
    let document = resolve_deck(store, deck).await?;
    let fsrs = Fsrs::from_settings(settings);

    match apply_rating(store, &fsrs, &document.id, order, rating, now).await? {
        Some(meta) => println!(
            "Rated card {order} {rating}; next review {} (stability {}, difficulty {})",
            meta.due_at_raw, meta.s, meta.d
        ),
        None => println!("Card {order} no longer exists in {}; skipped", document.name),
    }
    Ok(())
}

/// Run an interactive session on stdin/stdout.
pub async fn review(
    store: &oboeru_core::FsStore,
    settings: &Settings,
    deck: &str,
    mode: ReviewMode,
    seed: Option<u64>,
) -> Result<()> {
    let document = resolve_deck(store, deck).await?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    let session = Session {
        store,
        fsrs: Fsrs::from_settings(settings),
        deck_id: &document.id,
        mode,
        daily_limit: settings.daily_limit as usize,
    };
    let reviewed = session.run(input, &mut out, &mut session_rng(seed)).await?;
    writeln!(out, "Session finished: {reviewed} cards reviewed.")?;
    Ok(())
}

/// One pass over a deck's queue.
struct Session<'a, S: DocumentStore> {
    store: &'a S,
    fsrs: Fsrs,
    deck_id: &'a str,
    mode: ReviewMode,
    daily_limit: usize,
}

impl<S: DocumentStore> Session<'_, S> {
    /// Returns the number of cards shown to the end. Stops early on `q` or
    /// end of input.
    async fn run<R, W>(&self, input: R, out: &mut W, rng: &mut StdRng) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let cards = deck_cards(self.store, self.deck_id).await?;
        let queue = build_queue(&cards, self.mode, Utc::now(), self.daily_limit, rng);
        if queue.is_empty() {
            writeln!(out, "Nothing to review.")?;
            return Ok(0);
        }

        let mut lines = input.lines();
        let mut reviewed = 0;

        for (position, card) in queue.iter().enumerate() {
            writeln!(out, "\n[{}/{}] {}", position + 1, queue.len(), card.question)?;
            write!(out, "(Enter to reveal, q to quit) ")?;
            out.flush()?;
            match lines.next_line().await? {
                Some(line) if line.trim() != "q" => {}
                _ => break,
            }
            writeln!(out, "{}", card.answer)?;

            if self.mode == ReviewMode::Cram {
                reviewed += 1;
                continue;
            }

            let Some(rating) = self.read_rating(card, &mut lines, out).await? else {
                break;
            };
            match apply_rating(self.store, &self.fsrs, self.deck_id, card.order, rating, Utc::now()).await? {
                Some(meta) => writeln!(out, "Next review {}", meta.due_at_raw)?,
                None => writeln!(out, "Card changed on disk; skipped")?,
            }
            reviewed += 1;
        }

        Ok(reviewed)
    }

    /// Prompt until a valid rating is entered. `None` on quit or end of input.
    async fn read_rating<R, W>(
        &self,
        card: &Card,
        lines: &mut tokio::io::Lines<R>,
        out: &mut W,
    ) -> Result<Option<Rating>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let intervals = preview(&self.fsrs, card, Utc::now());
        loop {
            write!(out, "{} > ", format_preview(&intervals))?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                return Ok(None);
            };
            if line.trim() == "q" {
                return Ok(None);
            }
            match line.parse::<Rating>() {
                Ok(rating) => return Ok(Some(rating)),
                Err(e) => writeln!(out, "{e}")?,
            }
        }
    }
}
