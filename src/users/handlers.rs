use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{non_empty, UpdateProfileRequest};
use crate::{
    auth::{
        dto::{validate_password, PublicUser},
        extractors::CurrentUser,
        password::hash_password,
    },
    error::AppError,
    response::{ok, Envelope},
    state::AppState,
    store::UserUpdate,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/users/profile", get(get_profile).put(update_profile))
}

/// The extractor has already loaded the caller from the store.
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<Envelope<PublicUser>> {
    ok(user)
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Envelope<PublicUser>>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let password_hash = match payload.password.filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };
    let changed_password = password_hash.is_some();

    let updates = UserUpdate {
        first_name: non_empty(payload.first_name),
        last_name: non_empty(payload.last_name),
        location: payload.location,
        password_hash,
    };

    let Some(updated) = state.store.update_user(user.id, updates).await? else {
        warn!("profile update for missing user");
        return Err(AppError::NotFound("User not found"));
    };

    info!(changed_password, "profile updated");
    Ok(ok(updated.into()))
}
