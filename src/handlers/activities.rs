use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::Identity;
use crate::database::store::StoreError;
use crate::database::ActivityPreference;
use crate::error::ApiError;
use crate::AppState;

use super::{ApiResponse, AppJson};

#[derive(Debug, Deserialize)]
pub struct AddActivityRequest {
    pub activity_id: i32,
}

/// Swaps one favourite activity for another. Both fields pass through to the
/// stored procedure, which resolves absent sides itself.
#[derive(Debug, Deserialize)]
pub struct UpdateActivityRequest {
    pub new_activity_id: Option<i32>,
    pub old_activity_id: Option<i32>,
}

/// POST /api/profiles/:user_id/activities - add a favourite activity
pub async fn add(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i32>,
    AppJson(payload): AppJson<AddActivityRequest>,
) -> Result<ApiResponse<ActivityPreference>, ApiError> {
    check_ownership(&state, user_id, &identity).await?;

    let preference = state.store.add_activity(user_id, payload.activity_id).await?;
    tracing::info!("activity {} added for profile {}", payload.activity_id, user_id);

    Ok(ApiResponse::created(preference))
}

/// PUT /api/profiles/:user_id/activities - update a favourite activity
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i32>,
    AppJson(payload): AppJson<UpdateActivityRequest>,
) -> Result<ApiResponse<ActivityPreference>, ApiError> {
    if payload.new_activity_id.is_none() && payload.old_activity_id.is_none() {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "new_activity_id".to_string(),
            "at least one of new_activity_id or old_activity_id is required".to_string(),
        );
        return Err(ApiError::validation("Request validation failed", field_errors));
    }

    check_ownership(&state, user_id, &identity).await?;

    let preference = state
        .store
        .update_activity(user_id, payload.new_activity_id, payload.old_activity_id)
        .await?;

    Ok(ApiResponse::success(preference))
}

/// Ownership check for activity operations. When the profile does not exist
/// the check passes through, so the database foreign-key violation surfaces
/// as a 409 constraint error rather than a handler-level 404.
async fn check_ownership(
    state: &AppState,
    user_id: i32,
    identity: &Identity,
) -> Result<(), ApiError> {
    match state.store.get_profile(user_id).await {
        Ok(profile) if !profile.owned_by(&identity.email) => Err(ApiError::forbidden(
            "You may only modify your own activity preferences",
        )),
        Ok(_) => Ok(()),
        Err(StoreError::NotFound(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
