//! Answer outcome normalization.
//!
//! The swipe UI submits an explicit 2-5 rating; other surfaces submit
//! only correctness plus answer latency. Both collapse to a single
//! [`Quality`] here so every surface feeds the scheduler the same
//! signal.

use crate::types::Quality;

/// Correct answers at or under this latency count as Easy.
const EASY_LATENCY_MS: i64 = 4000;
/// Correct answers at or under this latency count as Good; slower ones
/// count as Hard.
const GOOD_LATENCY_MS: i64 = 8000;

/// Derive the canonical quality for one answer.
///
/// An explicit rating always wins. Without one, a wrong answer is
/// Again and a correct answer maps from answer speed; an unmeasured
/// latency (zero or negative) stays neutral at Good.
pub fn normalize(explicit: Option<Quality>, correct: bool, latency_ms: i64) -> Quality {
    if let Some(quality) = explicit {
        return quality;
    }
    if !correct {
        return Quality::Again;
    }
    if latency_ms <= 0 {
        Quality::Good
    } else if latency_ms <= EASY_LATENCY_MS {
        Quality::Easy
    } else if latency_ms <= GOOD_LATENCY_MS {
        Quality::Good
    } else {
        Quality::Hard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_rating_always_wins() {
        assert_eq!(normalize(Some(Quality::Hard), true, 100), Quality::Hard);
        assert_eq!(normalize(Some(Quality::Easy), false, 100), Quality::Easy);
        assert_eq!(normalize(Some(Quality::Again), true, 20000), Quality::Again);
    }

    #[test]
    fn wrong_answer_is_again() {
        assert_eq!(normalize(None, false, 500), Quality::Again);
        assert_eq!(normalize(None, false, 0), Quality::Again);
    }

    #[test]
    fn fast_correct_answer_is_easy() {
        assert_eq!(normalize(None, true, 1), Quality::Easy);
        assert_eq!(normalize(None, true, 3999), Quality::Easy);
        assert_eq!(normalize(None, true, 4000), Quality::Easy);
    }

    #[test]
    fn medium_correct_answer_is_good() {
        assert_eq!(normalize(None, true, 4001), Quality::Good);
        assert_eq!(normalize(None, true, 8000), Quality::Good);
    }

    #[test]
    fn slow_correct_answer_is_hard() {
        assert_eq!(normalize(None, true, 8001), Quality::Hard);
        assert_eq!(normalize(None, true, 60000), Quality::Hard);
    }

    #[test]
    fn unmeasured_latency_stays_neutral() {
        assert_eq!(normalize(None, true, 0), Quality::Good);
        assert_eq!(normalize(None, true, -1), Quality::Good);
    }
}
