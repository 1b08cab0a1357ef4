//! Deck endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/decks
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DeckListResponse>> {
    let decks = state.db.get_deck_infos(auth.user_id).await?;
    Ok(Json(DeckListResponse { decks }))
}

/// GET /api/decks/:deck/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck): Path<String>,
) -> Result<Json<DeckStatsResponse>> {
    let graduated_step = state.scheduler.learning_steps.len() as i16;
    let stats = state
        .db
        .get_deck_stats(auth.user_id, &deck, graduated_step)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {} not in catalog", deck)))?;

    Ok(Json(stats))
}
