//! User registration and profile endpoints

use axum::{extract::State, Extension, Json};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{MeResponse, RegisterRequest, RegisterResponse};
use crate::routes::auth::{hash_token, AuthenticatedUser};
use crate::AppState;

/// POST /api/users/register
/// Creates a new user and returns the bearer token. The token is shown
/// exactly once; only its hash is stored.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Option<RegisterRequest>>,
) -> Result<Json<RegisterResponse>> {
    let name = payload.and_then(|p| p.name);
    let token = Uuid::new_v4().to_string();
    let user = state
        .db
        .create_user(&hash_token(&token), name.as_deref())
        .await?;

    tracing::info!("Registered new user: {}", user.id);

    Ok(Json(RegisterResponse {
        user_id: user.id,
        token,
    }))
}

/// GET /api/users/me
/// Returns the profile and lifetime answer totals
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let totals = state.db.get_user_totals(auth.user_id).await?;

    Ok(Json(MeResponse {
        user_id: user.id,
        name: user.name,
        curriculum_pos: user.curriculum_pos,
        enrolled: totals.enrolled,
        seen: totals.seen,
        correct: totals.correct,
        wrong: totals.wrong,
        created_at: user.created_at,
        last_seen_at: user.last_seen_at,
    }))
}
