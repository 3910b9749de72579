//! Core flashcard engine for decks kept as plain markdown documents.
//!
//! Provides:
//! - Parser for `question :: answer` and multi-line `?` / `+++` cards
//! - Inline metadata codec (`<!--OBOERU:{...}-->` markers)
//! - FSRS-6 scheduler
//! - Session queue builder (review and cram modes)
//! - Rating applicator that patches the document text in place
//! - Document store seam with a filesystem implementation

pub mod algorithm;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod queue;
pub mod review;
pub mod store;
pub mod types;

pub use algorithm::{fsrs::Fsrs, RatingPreview, SchedulingResult, SpacedRepetitionAlgorithm};
pub use error::{SettingsError, StoreError};
pub use parser::parse;
pub use queue::build_queue;
pub use review::{apply_rating, list_decks, load_cards, preview, summarize};
pub use store::{DocumentInfo, DocumentStore, FsStore};
pub use types::{
    Card, CardFormat, CardMeta, CardState, CardStatus, DeckSummary, Rating, ReviewMode, Settings,
};
