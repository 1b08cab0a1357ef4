//! Core scheduling library shared by the kanji review backend.
//!
//! Provides:
//! - Spaced repetition scheduler (SM-2 ease model with sub-day learning steps)
//! - Answer outcome normalization to the canonical quality scale
//! - Due-queue prioritization (scoring and ranking)
//! - Bundled kanji dataset parsing and the component overlap index
//! - Shared types (ReviewState, Quality, KanjiEntry, etc.)

pub mod dataset;
pub mod error;
pub mod queue;
pub mod rating;
pub mod scheduler;
pub mod types;

pub use dataset::{parse_dataset, ComponentIndex, Example, KanjiEntry, RelatedKanji};
pub use error::DatasetError;
pub use queue::{priority_score, rank_due};
pub use rating::normalize;
pub use scheduler::{Scheduler, MIN_EASE};
pub use types::{Quality, ReviewState};
