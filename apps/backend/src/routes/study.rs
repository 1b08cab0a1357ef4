//! Study endpoints

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use srs_core::{queue::rank_due, rating::normalize, Quality, ReviewState};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// Queue size when the client does not ask for one.
const DEFAULT_QUEUE_LIMIT: i64 = 20;

/// GET /api/study/queue
pub async fn queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueResponse>> {
    let now = Utc::now();
    let due = state
        .db
        .get_due_states(auth.user_id, query.deck.as_deref(), now)
        .await?;
    let total_due = due.len();

    let records: Vec<(i64, ReviewState)> = due
        .into_iter()
        .map(|row| (row.kanji_id, row.to_core_state()))
        .collect();

    let limit = query.limit.unwrap_or(DEFAULT_QUEUE_LIMIT);
    let ranked = rank_due(records, usize::try_from(limit).unwrap_or(0));

    // Resolve the ranked records against the catalog. Records pointing
    // at a missing card are dropped, never served.
    let kanji_ids: Vec<i64> = ranked.iter().map(|(kanji_id, _)| *kanji_id).collect();
    let by_id: HashMap<i64, DbKanji> = state
        .db
        .get_kanji_by_ids(&kanji_ids)
        .await?
        .into_iter()
        .map(|kanji| (kanji.id, kanji))
        .collect();

    let mut cards = Vec::with_capacity(ranked.len());
    for (kanji_id, review) in ranked {
        match by_id.get(&kanji_id) {
            Some(kanji) => cards.push(QueueCard {
                kanji: kanji.to_api_card(),
                state: review,
            }),
            None => {
                tracing::warn!("Skipping review record for missing kanji {}", kanji_id);
            }
        }
    }

    Ok(Json(QueueResponse { cards, total_due }))
}

/// POST /api/study/answer
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    // Validate the explicit rating before touching the store
    let explicit = match payload.rating {
        Some(value) => Some(
            u8::try_from(value)
                .ok()
                .and_then(Quality::from_value)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid rating: {}", value)))?,
        ),
        None => None,
    };

    let kanji = state
        .db
        .get_kanji(payload.card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Kanji {} not in catalog", payload.card_id)))?;

    let latency_ms = payload.latency_ms.unwrap_or(0);
    let quality = normalize(explicit, payload.correct, latency_ms);
    let now = Utc::now();

    // First answer for an unenrolled card starts from a fresh record
    let written = state
        .db
        .submit_answer(auth.user_id, &kanji, |current| {
            let current = current.unwrap_or_else(|| state.scheduler.initial_state(now));
            state.scheduler.apply(&current, quality, latency_ms, now)
        })
        .await?;

    Ok(Json(AnswerResponse {
        quality,
        due_at: written.due_at,
        state: written.to_core_state(),
    }))
}

/// POST /api/study/seed
/// Enrolls cards by creating fresh review records. Already-enrolled
/// cards are skipped.
pub async fn seed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<SeedRequest>,
) -> Result<Json<SeedResponse>> {
    let targets = if let Some(card_ids) = payload.card_ids {
        if card_ids.is_empty() {
            return Err(ApiError::BadRequest("card_ids must not be empty".to_string()));
        }
        state.db.get_kanji_by_ids(&card_ids).await?
    } else if let Some(deck) = payload.deck {
        state.db.get_kanji_for_deck(&deck).await?
    } else if let Some(group) = payload.group {
        state.db.get_kanji_for_group(&group).await?
    } else if payload.all.unwrap_or(false) {
        state.db.get_all_kanji().await?
    } else {
        return Err(ApiError::BadRequest(
            "Provide card_ids, deck, group, or all".to_string(),
        ));
    };

    let fresh = state.scheduler.initial_state(Utc::now());
    let created = state
        .db
        .seed_review_states(auth.user_id, &targets, &fresh)
        .await?;

    tracing::info!("Seeded {} review records for user {}", created, auth.user_id);

    Ok(Json(SeedResponse { created }))
}

/// POST /api/study/reset
/// Deletes every review record and rewinds the curriculum cursor. The
/// catalog itself is untouched.
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ResetResponse>> {
    let removed = state.db.reset_progress(auth.user_id).await?;

    tracing::info!("Reset progress for user {}: {} records removed", auth.user_id, removed);

    Ok(Json(ResetResponse { removed }))
}
