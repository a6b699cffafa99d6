// Shared test doubles and request helpers. The router is exercised
// in-process with tower's `oneshot`, with the database and the external
// auth collaborator both replaced by stubs behind their trait seams.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use base64::Engine as _;
use chrono::Utc;
use serde_json::Value;

use trail_profile_api::auth::{AuthError, Authenticator, Identity};
use trail_profile_api::database::store::{NewProfile, ProfileChanges, ProfileStore, StoreError};
use trail_profile_api::database::{ActivityPreference, UserProfile};
use trail_profile_api::{app, AppState};

pub const ALICE: (&str, &str) = ("alice@example.com", "wonderland");
pub const BOB: (&str, &str) = ("bob@example.com", "builder");

/// Activities known to the stub, mirroring the seed catalogue
const ACTIVITIES: [(i32, &str); 3] = [(1, "Running"), (2, "Cycling"), (3, "Hiking")];

#[derive(Default)]
struct StubState {
    next_user_id: i32,
    next_preference_id: i32,
    profiles: HashMap<i32, UserProfile>,
    preferences: Vec<ActivityPreference>,
}

/// In-memory stand-in for the stored-procedure store. Reproduces the
/// database-owned invariants the handlers rely on: unique username/email,
/// the profile foreign key on preferences, and the known-activity catalogue.
#[derive(Default)]
pub struct StubStore {
    state: Mutex<StubState>,
}

fn activity_name(activity_id: i32) -> Option<&'static str> {
    ACTIVITIES.iter().find(|(id, _)| *id == activity_id).map(|(_, name)| *name)
}

#[async_trait]
impl ProfileStore for StubStore {
    async fn create_profile(&self, profile: &NewProfile) -> Result<UserProfile, StoreError> {
        let mut state = self.state.lock().unwrap();

        if state.profiles.values().any(|p| p.username == profile.username) {
            return Err(StoreError::Constraint("Username already exists".to_string()));
        }
        if let Some(email) = &profile.email {
            if state.profiles.values().any(|p| p.email.as_deref() == Some(email.as_str())) {
                return Err(StoreError::Constraint("Email already exists".to_string()));
            }
        }

        state.next_user_id += 1;
        let created = UserProfile {
            user_id: state.next_user_id,
            username: profile.username.clone(),
            email: profile.email.clone(),
            phone_number: profile.phone_number.clone(),
            location: profile.location.clone(),
            date_of_birth: profile.date_of_birth,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        state.profiles.insert(created.user_id, created.clone());
        Ok(created)
    }

    async fn get_profile(&self, user_id: i32) -> Result<UserProfile, StoreError> {
        let state = self.state.lock().unwrap();
        state
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))
    }

    async fn update_profile(
        &self,
        user_id: i32,
        changes: &ProfileChanges,
    ) -> Result<UserProfile, StoreError> {
        let mut state = self.state.lock().unwrap();

        if !state.profiles.contains_key(&user_id) {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        if let Some(username) = &changes.username {
            if state
                .profiles
                .values()
                .any(|p| p.user_id != user_id && &p.username == username)
            {
                return Err(StoreError::Constraint("Username already exists".to_string()));
            }
        }
        if let Some(email) = &changes.email {
            if state
                .profiles
                .values()
                .any(|p| p.user_id != user_id && p.email.as_deref() == Some(email.as_str()))
            {
                return Err(StoreError::Constraint("Email already exists".to_string()));
            }
        }

        let profile = state.profiles.get_mut(&user_id).unwrap();
        if let Some(username) = &changes.username {
            profile.username = username.clone();
        }
        if let Some(email) = &changes.email {
            profile.email = Some(email.clone());
        }
        if let Some(phone) = &changes.phone_number {
            profile.phone_number = Some(phone.clone());
        }
        if let Some(location) = &changes.location {
            profile.location = Some(location.clone());
        }
        if let Some(dob) = changes.date_of_birth {
            profile.date_of_birth = Some(dob);
        }
        profile.updated_at = Some(Utc::now());
        Ok(profile.clone())
    }

    async fn delete_profile(&self, user_id: i32) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.profiles.remove(&user_id).is_none() {
            return Err(StoreError::NotFound("User not found".to_string()));
        }
        state.preferences.retain(|p| p.user_id != user_id);
        Ok(())
    }

    async fn add_activity(
        &self,
        user_id: i32,
        activity_id: i32,
    ) -> Result<ActivityPreference, StoreError> {
        let mut state = self.state.lock().unwrap();

        // Foreign key on the owning profile
        if !state.profiles.contains_key(&user_id) {
            return Err(StoreError::Constraint(
                "Referenced profile or activity does not exist".to_string(),
            ));
        }
        let Some(name) = activity_name(activity_id) else {
            return Err(StoreError::NotFound("Activity not found".to_string()));
        };
        if state
            .preferences
            .iter()
            .any(|p| p.user_id == user_id && p.activity_id == activity_id)
        {
            return Err(StoreError::Constraint(
                "Activity already exists for this user".to_string(),
            ));
        }

        state.next_preference_id += 1;
        let preference = ActivityPreference {
            preference_id: state.next_preference_id,
            user_id,
            activity_id,
            activity_name: Some(name.to_string()),
        };
        state.preferences.push(preference.clone());
        Ok(preference)
    }

    async fn update_activity(
        &self,
        user_id: i32,
        new_activity_id: Option<i32>,
        old_activity_id: Option<i32>,
    ) -> Result<ActivityPreference, StoreError> {
        let mut state = self.state.lock().unwrap();

        if !state.profiles.contains_key(&user_id) {
            return Err(StoreError::Constraint(
                "Referenced profile or activity does not exist".to_string(),
            ));
        }

        let new_name = match new_activity_id {
            Some(id) => match activity_name(id) {
                Some(name) => Some(name),
                None => return Err(StoreError::NotFound("New activity not found".to_string())),
            },
            None => None,
        };

        if let Some(new_id) = new_activity_id {
            if state
                .preferences
                .iter()
                .any(|p| p.user_id == user_id && p.activity_id == new_id)
            {
                return Err(StoreError::Constraint(
                    "Activity already exists for this user".to_string(),
                ));
            }
        }

        let index = state
            .preferences
            .iter()
            .position(|p| {
                p.user_id == user_id
                    && old_activity_id.map(|old| p.activity_id == old).unwrap_or(true)
            })
            .ok_or_else(|| {
                // Matches the production classifier: "not found" RAISE
                // messages map to NotFound
                StoreError::NotFound("Old activity not found for this user".to_string())
            })?;

        let preference = &mut state.preferences[index];
        if let (Some(new_id), Some(name)) = (new_activity_id, new_name) {
            preference.activity_id = new_id;
            preference.activity_name = Some(name.to_string());
        }
        Ok(preference.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Credential verifier double with a fixed account table.
pub struct StubVerifier {
    accounts: HashMap<String, String>,
}

impl Default for StubVerifier {
    fn default() -> Self {
        let mut accounts = HashMap::new();
        for (email, password) in [ALICE, BOB] {
            accounts.insert(email.to_string(), password.to_string());
        }
        Self { accounts }
    }
}

#[async_trait]
impl Authenticator for StubVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match self.accounts.get(email) {
            Some(stored) if stored == password => Ok(Identity { email: email.to_string() }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Fresh application with empty stub state; profile ids start at 1.
pub fn test_app() -> Router {
    let state = AppState {
        store: Arc::new(StubStore::default()),
        auth: Arc::new(StubVerifier::default()),
    };
    app(state)
}

pub fn basic(credentials: (&str, &str)) -> String {
    let encoded = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", credentials.0, credentials.1));
    format!("Basic {}", encoded)
}

/// Build a request with optional basic-auth credentials and JSON body.
pub fn request(
    method: &str,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(creds) = credentials {
        builder = builder.header(header::AUTHORIZATION, basic(creds));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
