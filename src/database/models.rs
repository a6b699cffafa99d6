use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user profile row as returned by the profile stored procedures.
/// Identifier and timestamps are assigned by the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub user_id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Ownership rule: the verified identity email must match the profile's
    /// stored email, case-insensitive. Profiles without a stored email are
    /// not modifiable over the API.
    pub fn owned_by(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .map(|e| e.eq_ignore_ascii_case(email))
            .unwrap_or(false)
    }
}

/// A favourite-activity row, always scoped to an existing profile.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActivityPreference {
    pub preference_id: i32,
    pub user_id: i32,
    pub activity_id: i32,
    pub activity_name: Option<String>,
}
