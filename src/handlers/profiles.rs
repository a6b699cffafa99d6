use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::Identity;
use crate::database::store::{NewProfile, ProfileChanges};
use crate::database::UserProfile;
use crate::error::ApiError;
use crate::AppState;

use super::{ApiResponse, AppJson};

/// Payload for creating a profile. Bounds mirror the database schema so bad
/// input is rejected before any procedure call.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "phone number must be at most 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "location must be at most 100 characters"))]
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Payload for updating a profile; all fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "phone number must be at most 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "location must be at most 100 characters"))]
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// POST /api/profiles - create a new profile
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(payload): AppJson<CreateProfileRequest>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    payload.validate()?;

    let new_profile = NewProfile {
        username: payload.username,
        email: payload.email,
        phone_number: payload.phone_number,
        location: payload.location,
        date_of_birth: payload.date_of_birth,
    };

    let profile = state.store.create_profile(&new_profile).await?;
    tracing::info!("profile {} created by {}", profile.user_id, identity.email);

    Ok(ApiResponse::created(profile))
}

/// GET /api/profiles/:user_id - read a profile by id
pub async fn get(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
    Path(user_id): Path<i32>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let profile = state.store.get_profile(user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/profiles/:user_id - update profile fields
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i32>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    payload.validate()?;

    let current = state.store.get_profile(user_id).await?;
    if !current.owned_by(&identity.email) {
        return Err(ApiError::forbidden("You may only modify your own profile"));
    }

    let changes = ProfileChanges {
        username: payload.username,
        email: payload.email,
        phone_number: payload.phone_number,
        location: payload.location,
        date_of_birth: payload.date_of_birth,
    };

    let profile = state.store.update_profile(user_id, &changes).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /api/profiles/:user_id - remove a profile
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i32>,
) -> Result<ApiResponse<Value>, ApiError> {
    let current = state.store.get_profile(user_id).await?;
    if !current.owned_by(&identity.email) {
        return Err(ApiError::forbidden("You may only delete your own profile"));
    }

    state.store.delete_profile(user_id).await?;
    tracing::info!("profile {} deleted by {}", user_id, identity.email);

    Ok(ApiResponse::success(json!({ "message": "Profile deleted successfully" })))
}
