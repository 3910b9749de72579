//! `oboeru`: review flashcards kept inside markdown notes.

mod commands;
mod config;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use oboeru_core::{FsStore, Rating, ReviewMode};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "oboeru", version, about = "Spaced repetition for flashcards in markdown notes")]
struct Cli {
    /// Directory holding the markdown notes.
    #[arg(long, env = "OBOERU_VAULT", default_value = ".")]
    vault: PathBuf,

    /// Settings file (defaults to the user config directory).
    #[arg(long, env = "OBOERU_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List decks with total, due and new counts.
    Decks,
    /// List the cards of a deck.
    Cards { deck: String },
    /// Show the queue a session would present.
    Queue {
        deck: String,
        #[arg(long)]
        cram: bool,
        /// Fixed shuffle seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the interval each rating would give a card.
    Preview { deck: String, order: usize },
    /// Rate a card (again, hard, good, easy or 1-4).
    Rate {
        deck: String,
        order: usize,
        rating: Rating,
    },
    /// Review a deck interactively.
    Review {
        deck: String,
        /// Go through every card without saving ratings.
        #[arg(long)]
        cram: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show or change settings.
    Config {
        /// Update a setting, e.g. `--set daily_limit=30`.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

fn mode(cram: bool) -> ReviewMode {
    if cram {
        ReviewMode::Cram
    } else {
        ReviewMode::Review
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let settings = config::load(&config_path)?;
    let store = FsStore::new(&cli.vault);
    let now = Utc::now();

    tracing::debug!(vault = %cli.vault.display(), config = %config_path.display(), "starting");

    match cli.command {
        Command::Decks => commands::deck::list(&store, now).await,
        Command::Cards { deck } => commands::deck::cards(&store, &deck, now).await,
        Command::Queue { deck, cram, seed } => {
            commands::study::queue(&store, &settings, &deck, mode(cram), seed, now).await
        }
        Command::Preview { deck, order } => {
            commands::study::show_preview(&store, &settings, &deck, order, now).await
        }
        Command::Rate { deck, order, rating } => {
            commands::study::rate(&store, &settings, &deck, order, rating, now).await
        }
        Command::Review { deck, cram, seed } => {
            commands::study::review(&store, &settings, &deck, mode(cram), seed).await
        }
        Command::Config { set } => commands::settings::run(&config_path, settings, &set),
    }
}
