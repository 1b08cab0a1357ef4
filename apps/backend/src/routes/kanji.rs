//! Kanji catalog endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/kanji/:character
pub async fn detail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(character): Path<String>,
) -> Result<Json<KanjiDetailResponse>> {
    let kanji = state
        .db
        .get_kanji_by_character(&character)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Kanji {} not in catalog", character)))?;

    let review = state.db.get_review_state(auth.user_id, kanji.id).await?;
    let related = resolve_related(&state, &kanji.character).await?;

    Ok(Json(KanjiDetailResponse {
        kanji: kanji.to_api_card(),
        state: review.map(|row| row.to_core_state()),
        related,
    }))
}

/// GET /api/kanji/:character/related
pub async fn related(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthenticatedUser>,
    Path(character): Path<String>,
) -> Result<Json<RelatedResponse>> {
    let kanji = state
        .db
        .get_kanji_by_character(&character)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Kanji {} not in catalog", character)))?;

    let related = resolve_related(&state, &kanji.character).await?;

    Ok(Json(RelatedResponse {
        character: kanji.character,
        related,
    }))
}

/// Resolve index suggestions against the catalog, keeping the index
/// order. Suggestions without a catalog row are dropped.
async fn resolve_related(state: &AppState, character: &str) -> Result<Vec<RelatedCard>> {
    let suggestions = state.components.related(character);
    if suggestions.is_empty() {
        return Ok(Vec::new());
    }

    let characters: Vec<String> = suggestions
        .iter()
        .map(|suggestion| suggestion.character.clone())
        .collect();
    let meanings: HashMap<String, String> = state
        .db
        .get_kanji_by_characters(&characters)
        .await?
        .into_iter()
        .map(|kanji| (kanji.character, kanji.meaning))
        .collect();

    Ok(suggestions
        .into_iter()
        .filter_map(|suggestion| {
            meanings.get(&suggestion.character).map(|meaning| RelatedCard {
                character: suggestion.character,
                meaning: meaning.clone(),
                shared_components: suggestion.shared_components,
            })
        })
        .collect())
}
