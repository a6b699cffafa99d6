use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AuthConfig;

/// Verified caller identity for the current request. Transient; never
/// persisted by this service.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Auth service unavailable: {0}")]
    Unavailable(String),
}

/// Port to the external credential-verification collaborator. Opaque beyond
/// its contract: credentials in, identity or failure out.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
}

/// HTTP client for the external verifier. The verifier accepts
/// `{"email", "password"}` and replies 200 with the JSON array
/// `["Verified", "True"]` when the credentials are valid.
pub struct VerifierClient {
    client: reqwest::Client,
    endpoint: String,
}

impl VerifierClient {
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, endpoint: config.endpoint.clone() })
    }
}

#[async_trait]
impl Authenticator for VerifierClient {
    async fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            warn!("credential check rejected with status {} for {}", response.status(), email);
            return Err(AuthError::InvalidCredentials);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if is_verified(&body) {
            info!("user authenticated: {}", email);
            Ok(Identity { email: email.to_string() })
        } else {
            warn!("authentication failed for: {}", email);
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Success is the exact array `["Verified", "True"]`; anything else is a
/// rejection.
fn is_verified(body: &Value) -> bool {
    match body.as_array() {
        Some(items) if items.len() >= 2 => items[0] == "Verified" && items[1] == "True",
        _ => false,
    }
}
