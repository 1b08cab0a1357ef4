//! Test fixtures and factory functions for request bodies.

use serde_json::json;

/// Create a register request body.
pub fn register_request(name: Option<&str>) -> serde_json::Value {
    match name {
        Some(n) => json!({ "name": n }),
        None => json!({}),
    }
}

/// Create an answer request body.
pub fn answer_request(
    card_id: i64,
    rating: Option<i32>,
    correct: bool,
    latency_ms: Option<i64>,
) -> serde_json::Value {
    json!({
        "card_id": card_id,
        "rating": rating,
        "correct": correct,
        "latency_ms": latency_ms,
    })
}

/// Create a seed request targeting specific cards.
pub fn seed_cards_request(card_ids: &[i64]) -> serde_json::Value {
    json!({ "card_ids": card_ids })
}

/// Create a seed request targeting a whole deck.
pub fn seed_deck_request(deck: &str) -> serde_json::Value {
    json!({ "deck": deck })
}

/// Create a seed request targeting a group.
pub fn seed_group_request(group: &str) -> serde_json::Value {
    json!({ "group": group })
}

/// Create a lesson complete request body.
pub fn complete_request(card_ids: &[i64]) -> serde_json::Value {
    json!({ "card_ids": card_ids })
}
