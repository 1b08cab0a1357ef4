//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from srs-core
pub use srs_core::{Example, KanjiEntry, Quality, RelatedKanji, ReviewState};

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token_hash: String,
    pub name: Option<String>,
    /// Curriculum cursor: order_index of the next unseen catalog entry.
    pub curriculum_pos: i32,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Kanji catalog row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbKanji {
    pub id: i64,
    pub character: String,
    pub meaning: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub deck: String,
    pub group_key: String,
    pub order_index: i32,
    pub example_jp: Option<String>,
    pub example_en: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbKanji {
    /// Convert to the API card type
    pub fn to_api_card(&self) -> KanjiCard {
        KanjiCard {
            id: self.id,
            character: self.character.clone(),
            meaning: self.meaning.clone(),
            onyomi: self.onyomi.clone(),
            kunyomi: self.kunyomi.clone(),
            deck: self.deck.clone(),
            group_key: self.group_key.clone(),
            example: match (&self.example_jp, &self.example_en) {
                (Some(jp), Some(en)) => Some(Example {
                    jp: jp.clone(),
                    en: en.clone(),
                }),
                _ => None,
            },
        }
    }
}

/// Per-user review record in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kanji_id: i64,
    /// Deck and group copied from the catalog row at enrollment time so
    /// queue filters never need a join.
    pub deck: String,
    pub group_key: String,
    pub due_at: DateTime<Utc>,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub learning_step: i16,
    pub reps: i32,
    pub lapses: i32,
    pub seen: i32,
    pub correct: i32,
    pub wrong: i32,
    pub last_correct: bool,
    pub last_answer_ms: i64,
    pub avg_answer_ms: f64,
    pub last_answered_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbReviewState {
    /// Create from an srs-core ReviewState
    pub fn from_core_state(user_id: Uuid, kanji: &DbKanji, state: &ReviewState) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kanji_id: kanji.id,
            deck: kanji.deck.clone(),
            group_key: kanji.group_key.clone(),
            due_at: state.due_at,
            ease_factor: state.ease_factor,
            interval_days: state.interval_days as i32,
            learning_step: state.learning_step as i16,
            reps: state.reps as i32,
            lapses: state.lapses as i32,
            seen: state.seen as i32,
            correct: state.correct as i32,
            wrong: state.wrong as i32,
            last_correct: state.last_correct,
            last_answer_ms: state.last_answer_ms,
            avg_answer_ms: state.avg_answer_ms,
            last_answered_at: state.last_answered_at,
            last_reviewed_at: state.last_reviewed_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Convert to an srs-core ReviewState
    pub fn to_core_state(&self) -> ReviewState {
        ReviewState {
            due_at: self.due_at,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days as i64,
            learning_step: self.learning_step as usize,
            reps: self.reps as u32,
            lapses: self.lapses as u32,
            seen: self.seen as u32,
            correct: self.correct as u32,
            wrong: self.wrong as u32,
            last_correct: self.last_correct,
            last_answer_ms: self.last_answer_ms,
            avg_answer_ms: self.avg_answer_ms,
            last_answered_at: self.last_answered_at,
            last_reviewed_at: self.last_reviewed_at,
        }
    }
}

/// Per-deck aggregate counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeckInfo {
    pub deck: String,
    pub total: i64,
    pub enrolled: i64,
    pub due: i64,
}

/// Lifetime answer totals for one user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserTotals {
    pub enrolled: i64,
    pub seen: i64,
    pub correct: i64,
    pub wrong: i64,
}

// === API Request/Response Types ===

/// Kanji as served by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanjiCard {
    pub id: i64,
    pub character: String,
    pub meaning: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub deck: String,
    pub group_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
}

/// Related kanji resolved against the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedCard {
    pub character: String,
    pub meaning: String,
    pub shared_components: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub curriculum_pos: i32,
    pub enrolled: i64,
    pub seen: i64,
    pub correct: i64,
    pub wrong: i64,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

// Study types

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueQuery {
    pub deck: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueCard {
    pub kanji: KanjiCard,
    pub state: ReviewState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueueResponse {
    pub cards: Vec<QueueCard>,
    /// Count of due records before the limit was applied.
    pub total_due: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub card_id: i64,
    /// Explicit 2-5 rating from the swipe UI; wins over correct/latency.
    pub rating: Option<i32>,
    pub correct: bool,
    pub latency_ms: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The quality the answer normalized to.
    pub quality: Quality,
    pub state: ReviewState,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedRequest {
    pub card_ids: Option<Vec<i64>>,
    pub deck: Option<String>,
    pub group: Option<String>,
    pub all: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub created: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub removed: usize,
}

// Lesson types

#[derive(Debug, Serialize, Deserialize)]
pub struct LearnQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LearnCard {
    pub kanji: KanjiCard,
    /// Mnemonic hooks: catalog kanji sharing components with this one.
    pub related: Vec<RelatedKanji>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LearnResponse {
    pub cards: Vec<LearnCard>,
    pub cursor: i32,
    pub remaining: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub card_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteResponse {
    pub enrolled: usize,
    pub cursor: i32,
}

// Deck types

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckStatsResponse {
    pub deck: String,
    pub total: usize,
    pub enrolled: usize,
    pub learning: usize,
    pub graduated: usize,
    pub due_now: usize,
    pub lapses: usize,
    pub average_ease: f64,
    pub average_interval: f64,
    /// Lifetime correct / seen over the deck, 0.0 before any answers.
    pub accuracy: f64,
}

// Kanji types

#[derive(Debug, Serialize, Deserialize)]
pub struct KanjiDetailResponse {
    pub kanji: KanjiCard,
    pub state: Option<ReviewState>,
    pub related: Vec<RelatedCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelatedResponse {
    pub character: String,
    pub related: Vec<RelatedCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_state_round_trips_through_the_db_row() {
        let now = Utc::now();
        let kanji = DbKanji {
            id: 7,
            character: "時".to_string(),
            meaning: "time".to_string(),
            onyomi: vec!["ジ".to_string()],
            kunyomi: vec!["とき".to_string()],
            deck: "jlpt-n5".to_string(),
            group_key: "grade-2".to_string(),
            order_index: 30,
            example_jp: None,
            example_en: None,
            created_at: now,
        };

        let mut state = ReviewState::new(now);
        state.learning_step = 3;
        state.interval_days = 15;
        state.reps = 3;
        state.lapses = 1;
        state.seen = 9;
        state.correct = 7;
        state.wrong = 2;
        state.last_correct = true;
        state.last_answer_ms = 4200;
        state.avg_answer_ms = 3900.5;
        state.last_answered_at = Some(now);
        state.last_reviewed_at = Some(now);

        let user_id = Uuid::new_v4();
        let row = DbReviewState::from_core_state(user_id, &kanji, &state);
        assert_eq!(row.user_id, user_id);
        assert_eq!(row.kanji_id, 7);
        assert_eq!(row.deck, "jlpt-n5");
        assert_eq!(row.to_core_state(), state);
    }

    #[test]
    fn api_card_carries_the_example_only_when_complete() {
        let now = Utc::now();
        let mut kanji = DbKanji {
            id: 1,
            character: "日".to_string(),
            meaning: "sun, day".to_string(),
            onyomi: vec![],
            kunyomi: vec![],
            deck: "jlpt-n5".to_string(),
            group_key: "grade-1".to_string(),
            order_index: 0,
            example_jp: Some("日が昇る。".to_string()),
            example_en: None,
            created_at: now,
        };
        assert!(kanji.to_api_card().example.is_none());

        kanji.example_en = Some("The sun rises.".to_string());
        let example = kanji.to_api_card().example.unwrap();
        assert_eq!(example.en, "The sun rises.");
    }
}
