use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::models::{ActivityPreference, UserProfile};

/// Errors from the data access layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Query error: {0}")]
    Query(String),
}

/// Fields for creating a profile. The identifier and timestamps are assigned
/// by the database.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update for a profile; absent fields are left unchanged by the
/// stored procedure.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Narrow port over the stored-procedure boundary: one method per logical
/// operation, so the real database can be swapped for a test double.
/// Implementations must perform exactly one procedure invocation per call.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, profile: &NewProfile) -> Result<UserProfile, StoreError>;

    async fn get_profile(&self, user_id: i32) -> Result<UserProfile, StoreError>;

    async fn update_profile(
        &self,
        user_id: i32,
        changes: &ProfileChanges,
    ) -> Result<UserProfile, StoreError>;

    async fn delete_profile(&self, user_id: i32) -> Result<(), StoreError>;

    async fn add_activity(
        &self,
        user_id: i32,
        activity_id: i32,
    ) -> Result<ActivityPreference, StoreError>;

    async fn update_activity(
        &self,
        user_id: i32,
        new_activity_id: Option<i32>,
        old_activity_id: Option<i32>,
    ) -> Result<ActivityPreference, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
