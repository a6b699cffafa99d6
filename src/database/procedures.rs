use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

use super::models::{ActivityPreference, UserProfile};
use super::operation::Operation;
use super::store::{NewProfile, ProfileChanges, ProfileStore, StoreError};

/// Stored-procedure backed implementation of [`ProfileStore`].
///
/// Every method performs exactly one procedure invocation. Connections are
/// pool-scoped per call: sqlx acquires one for the query and releases it on
/// every exit path, including failure.
pub struct ProcedureStore {
    pool: PgPool,
}

impl ProcedureStore {
    /// Build a lazily-connecting pool from configuration. The acquire timeout
    /// bounds how long a request can block on an unreachable database.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(&config.url)?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileStore for ProcedureStore {
    async fn create_profile(&self, profile: &NewProfile) -> Result<UserProfile, StoreError> {
        let sql = format!(
            "SELECT * FROM {}($1, $2, $3, $4, $5)",
            Operation::CreateProfile.procedure()
        );
        let created = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(&profile.username)
            .bind(&profile.email)
            .bind(&profile.phone_number)
            .bind(&profile.location)
            .bind(profile.date_of_birth)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        info!("profile created: {} ({})", created.username, created.user_id);
        Ok(created)
    }

    async fn get_profile(&self, user_id: i32) -> Result<UserProfile, StoreError> {
        let sql = format!("SELECT * FROM {}($1)", Operation::GetProfile.procedure());
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
    }

    async fn update_profile(
        &self,
        user_id: i32,
        changes: &ProfileChanges,
    ) -> Result<UserProfile, StoreError> {
        let sql = format!(
            "SELECT * FROM {}($1, $2, $3, $4, $5, $6)",
            Operation::UpdateProfile.procedure()
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(&changes.phone_number)
            .bind(&changes.location)
            .bind(changes.date_of_birth)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
    }

    async fn delete_profile(&self, user_id: i32) -> Result<(), StoreError> {
        // The procedure returns the number of rows removed
        let sql = format!("SELECT {}($1)", Operation::DeleteProfile.procedure());
        let deleted: i32 = sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        if deleted == 0 {
            return Err(StoreError::NotFound("User not found".to_string()));
        }

        info!("profile deleted: {}", user_id);
        Ok(())
    }

    async fn add_activity(
        &self,
        user_id: i32,
        activity_id: i32,
    ) -> Result<ActivityPreference, StoreError> {
        let sql = format!("SELECT * FROM {}($1, $2)", Operation::AddActivity.procedure());
        sqlx::query_as::<_, ActivityPreference>(&sql)
            .bind(user_id)
            .bind(activity_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn update_activity(
        &self,
        user_id: i32,
        new_activity_id: Option<i32>,
        old_activity_id: Option<i32>,
    ) -> Result<ActivityPreference, StoreError> {
        let sql = format!(
            "SELECT * FROM {}($1, $2, $3)",
            Operation::UpdateActivity.procedure()
        );
        sqlx::query_as::<_, ActivityPreference>(&sql)
            .bind(user_id)
            .bind(new_activity_id)
            .bind(old_activity_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

/// Classify sqlx errors into the store taxonomy.
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable("connection pool acquire timed out".to_string())
        }
        sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".to_string()),
        sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::Database(db) => classify_database(db.as_ref()),
        other => StoreError::Query(other.to_string()),
    }
}

/// Map database-reported errors. SQLSTATE class 23 covers integrity
/// constraint violations (foreign key, unique); everything else falls back to
/// the RAISE messages the procedures emit.
fn classify_database(db: &dyn sqlx::error::DatabaseError) -> StoreError {
    if let Some(code) = db.code() {
        if code.starts_with("23") {
            return StoreError::Constraint(procedure_message(db.message()));
        }
    }
    let msg = db.message().to_lowercase();
    if msg.contains("not found") {
        return StoreError::NotFound(procedure_message(db.message()));
    }
    if msg.contains("already exists")
        || msg.contains("date_of_birth")
        || msg.contains("phone_number")
    {
        return StoreError::Constraint(procedure_message(db.message()));
    }
    StoreError::Query(db.message().to_string())
}

/// Translate procedure RAISE messages into client-facing wording.
fn procedure_message(raw: &str) -> String {
    let msg = raw.to_lowercase();
    if msg.contains("user not found") {
        "User not found".to_string()
    } else if msg.contains("new activity not found") {
        "New activity not found".to_string()
    } else if msg.contains("old activity not found") {
        "Old activity not found for this user".to_string()
    } else if msg.contains("activity not found") {
        "Activity not found".to_string()
    } else if msg.contains("activity already exists") {
        "Activity already exists for this user".to_string()
    } else if msg.contains("email already exists") {
        "Email already exists".to_string()
    } else if msg.contains("username already exists") {
        "Username already exists".to_string()
    } else if msg.contains("date_of_birth") {
        "Invalid date of birth, must be at least 13 years old".to_string()
    } else if msg.contains("phone_number") {
        "Invalid phone number format, the number must start with +".to_string()
    } else if msg.contains("foreign key") {
        "Referenced profile or activity does not exist".to_string()
    } else {
        raw.to_string()
    }
}
