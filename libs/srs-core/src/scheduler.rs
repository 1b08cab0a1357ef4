//! Review scheduler.
//!
//! SM-2 derivative with sub-day learning steps: new and lapsed cards
//! climb a ladder of minute-granularity steps, then graduate to
//! day-granularity intervals grown by the ease factor.

use chrono::{DateTime, Duration, Utc};

use crate::types::{Quality, ReviewState};

/// Floor for the ease factor.
pub const MIN_EASE: f64 = 1.3;

/// EWMA weights for the smoothed answer latency.
const LATENCY_KEEP: f64 = 0.7;
const LATENCY_BLEND: f64 = 0.3;

/// Scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Learning steps in minutes. A card graduates after answering
    /// correctly on the final step.
    pub learning_steps: Vec<i64>,
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Flat ease penalty applied on a lapse.
    pub lapse_penalty: f64,
    /// Day interval granted on graduation.
    pub graduating_interval: i64,
    /// Day interval granted on graduation with an Easy answer.
    pub easy_interval: i64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            learning_steps: vec![10, 60, 240],
            initial_ease: 2.5,
            minimum_ease: MIN_EASE,
            lapse_penalty: 0.2,
            graduating_interval: 1,
            easy_interval: 2,
        }
    }
}

impl Scheduler {
    /// Fresh state for a newly enrolled card.
    pub fn initial_state(&self, now: DateTime<Utc>) -> ReviewState {
        let mut state = ReviewState::new(now);
        state.ease_factor = self.initial_ease;
        state
    }

    /// Whether the card has left the learning phase.
    pub fn is_graduated(&self, state: &ReviewState) -> bool {
        state.learning_step >= self.learning_steps.len()
    }

    /// Apply one answer to the card's state and return the successor.
    ///
    /// Pure given `now`; the caller persists the result.
    pub fn apply(
        &self,
        state: &ReviewState,
        quality: Quality,
        latency_ms: i64,
        now: DateTime<Utc>,
    ) -> ReviewState {
        let mut next = state.clone();

        if quality.is_lapse() {
            self.apply_lapse(&mut next, now);
        } else if self.is_graduated(state) {
            self.apply_graduated_success(&mut next, quality, now);
        } else {
            self.apply_learning_success(&mut next, quality, now);
        }

        self.record_answer(&mut next, quality, latency_ms, now);
        next
    }

    /// Lapse in either phase: back to the first learning step with a
    /// flat ease penalty. The graduated interval is forfeited.
    fn apply_lapse(&self, state: &mut ReviewState, now: DateTime<Utc>) {
        state.lapses += 1;
        state.reps = 0;
        state.learning_step = 0;
        state.interval_days = 0;
        state.ease_factor = (state.ease_factor - self.lapse_penalty).max(self.minimum_ease);
        state.due_at = now + Duration::minutes(self.learning_steps[0]);
    }

    fn apply_learning_success(&self, state: &mut ReviewState, quality: Quality, now: DateTime<Utc>) {
        let final_step = self.learning_steps.len() - 1;
        if state.learning_step < final_step {
            state.learning_step += 1;
            state.due_at = now + Duration::minutes(self.learning_steps[state.learning_step]);
        } else {
            // Graduation: the card moves to day-granularity intervals.
            state.learning_step = self.learning_steps.len();
            state.reps = 1;
            state.interval_days = if quality == Quality::Easy {
                self.easy_interval
            } else {
                self.graduating_interval
            };
            state.due_at = now + Duration::days(state.interval_days);
        }
        self.adjust_ease(state, quality);
    }

    /// Graduated success: grow the interval along the 1 / 6 / round(i * ease)
    /// ladder. The interval is computed with the pre-adjustment ease.
    fn apply_graduated_success(&self, state: &mut ReviewState, quality: Quality, now: DateTime<Utc>) {
        state.reps += 1;
        state.interval_days = match state.reps {
            1 => 1,
            2 => 6,
            _ => ((state.interval_days as f64 * state.ease_factor).round() as i64).max(1),
        };
        state.due_at = now + Duration::days(state.interval_days);
        self.adjust_ease(state, quality);
    }

    /// SM-2 ease update: +0.1 for Easy, unchanged for Good, -0.14 for Hard.
    fn adjust_ease(&self, state: &mut ReviewState, quality: Quality) {
        let q = quality.to_value() as f64;
        let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
        state.ease_factor = (state.ease_factor + delta).max(self.minimum_ease);
    }

    /// Bookkeeping shared by every transition: counters, recency flags
    /// and the latency EWMA. Non-positive latencies never blend in.
    fn record_answer(
        &self,
        state: &mut ReviewState,
        quality: Quality,
        latency_ms: i64,
        now: DateTime<Utc>,
    ) {
        state.seen += 1;
        if quality.is_lapse() {
            state.wrong += 1;
        } else {
            state.correct += 1;
        }
        state.last_correct = !quality.is_lapse();
        state.last_answer_ms = latency_ms;
        if latency_ms > 0 {
            state.avg_answer_ms = if state.avg_answer_ms > 0.0 {
                LATENCY_KEEP * state.avg_answer_ms + LATENCY_BLEND * latency_ms as f64
            } else {
                latency_ms as f64
            };
        }
        state.last_answered_at = Some(now);
        state.last_reviewed_at = Some(now);
    }
}
