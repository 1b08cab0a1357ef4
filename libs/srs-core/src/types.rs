//! Core types for review scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer quality for a single review.
///
/// Maps onto the numeric 2-5 scale used by the scheduler; anything
/// below 3 counts as a lapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    /// Convert to the numeric 2-5 value.
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 2,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    /// Create from the numeric 2-5 value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            2 => Some(Self::Again),
            3 => Some(Self::Hard),
            4 => Some(Self::Good),
            5 => Some(Self::Easy),
            _ => None,
        }
    }

    /// A lapse is any quality below 3.
    pub fn is_lapse(self) -> bool {
        self.to_value() < 3
    }
}

/// Scheduling state for one card and one learner.
///
/// Identity (user, card) and classification (deck, group) live on the
/// storage row; this struct carries only what the scheduler reads and
/// writes. Fresh records are due immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Next instant the card becomes eligible for review.
    pub due_at: DateTime<Utc>,
    /// SM-2 ease factor, never below the scheduler's minimum (1.3).
    pub ease_factor: f64,
    /// Graduated interval in days; 0 while in the learning phase.
    pub interval_days: i64,
    /// Position in the learning steps. Equal to the step count once
    /// the card has graduated.
    pub learning_step: usize,
    /// Consecutive graduated successes since the last lapse.
    pub reps: u32,
    /// Lifetime lapse count.
    pub lapses: u32,
    /// Total answers recorded.
    pub seen: u32,
    pub correct: u32,
    pub wrong: u32,
    /// Whether the most recent answer was correct.
    pub last_correct: bool,
    /// Latency of the most recent answer, 0 when unmeasured.
    pub last_answer_ms: i64,
    /// Smoothed answer latency (weights 0.7 old / 0.3 new), 0 until the
    /// first measured answer.
    pub avg_answer_ms: f64,
    pub last_answered_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl ReviewState {
    /// Fresh record for a newly enrolled card: immediately due, default
    /// ease, all counters zeroed.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            due_at: now,
            ease_factor: 2.5,
            interval_days: 0,
            learning_step: 0,
            reps: 0,
            lapses: 0,
            seen: 0,
            correct: 0,
            wrong: 0,
            last_correct: false,
            last_answer_ms: 0,
            avg_answer_ms: 0.0,
            last_answered_at: None,
            last_reviewed_at: None,
        }
    }
}
