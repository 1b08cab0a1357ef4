//! Due-queue prioritization.
//!
//! Scores already-fetched due records and returns the bounded working
//! set. Fetching and card resolution stay with the storage layer; this
//! module only orders what it is given.

use std::cmp::Ordering;

use crate::types::ReviewState;

/// Latency normalization divisor: 4 seconds of average answer time adds
/// one point of priority.
const LATENCY_UNIT_MS: f64 = 4000.0;

/// Boost for a card whose most recent answer was wrong.
const JUST_MISSED_BOOST: f64 = 2.0;

/// Priority of one due record. Error-prone and slow cards score
/// highest, with an extra boost when the last answer was a miss.
pub fn priority_score(state: &ReviewState) -> f64 {
    let wrong_rate = if state.seen == 0 {
        0.0
    } else {
        state.wrong as f64 / state.seen as f64
    };
    let miss_boost = if state.last_correct {
        0.0
    } else {
        JUST_MISSED_BOOST
    };
    wrong_rate * 3.0 + state.avg_answer_ms / LATENCY_UNIT_MS + miss_boost
}

/// Rank due records by descending priority and truncate to `limit`
/// (clamped to at least 1).
///
/// The sort is stable: records with equal scores keep their fetch
/// order.
pub fn rank_due<K>(records: Vec<(K, ReviewState)>, limit: usize) -> Vec<(K, ReviewState)> {
    let mut scored: Vec<(f64, (K, ReviewState))> = records
        .into_iter()
        .map(|record| (priority_score(&record.1), record))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, record)| record)
        .collect()
}
