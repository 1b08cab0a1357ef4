//! Lesson endpoints
//!
//! Lessons walk the catalog in curriculum order. Completing a lesson
//! enrolls its cards into the review rotation and moves the cursor.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

const DEFAULT_LESSON_LIMIT: i64 = 5;
const MAX_LESSON_LIMIT: i64 = 50;

/// GET /api/learn/next
pub async fn next(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<LearnQuery>,
) -> Result<Json<LearnResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_LESSON_LIMIT)
        .clamp(1, MAX_LESSON_LIMIT);

    let slice = state.db.get_catalog_slice(user.curriculum_pos, limit).await?;
    let remaining = state.db.count_catalog_from(user.curriculum_pos).await?;

    let cards = slice
        .into_iter()
        .map(|kanji| LearnCard {
            related: state.components.related(&kanji.character),
            kanji: kanji.to_api_card(),
        })
        .collect();

    Ok(Json(LearnResponse {
        cards,
        cursor: user.curriculum_pos,
        remaining: remaining as usize,
    }))
}

/// POST /api/learn/complete
/// Enrolls the lesson's cards and advances the curriculum cursor past
/// the highest completed entry.
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>> {
    if payload.card_ids.is_empty() {
        return Err(ApiError::BadRequest("card_ids must not be empty".to_string()));
    }

    let kanji = state.db.get_kanji_by_ids(&payload.card_ids).await?;
    if kanji.is_empty() {
        return Err(ApiError::NotFound("No matching kanji in catalog".to_string()));
    }

    let fresh = state.scheduler.initial_state(Utc::now());
    let enrolled = state
        .db
        .seed_review_states(auth.user_id, &kanji, &fresh)
        .await?;

    let next_pos = kanji
        .iter()
        .map(|entry| entry.order_index + 1)
        .max()
        .unwrap_or(0);
    let cursor = state.db.advance_curriculum(auth.user_id, next_pos).await?;

    tracing::info!(
        "User {} completed {} lesson cards, cursor at {}",
        auth.user_id,
        kanji.len(),
        cursor
    );

    Ok(Json(CompleteResponse { enrolled, cursor }))
}
