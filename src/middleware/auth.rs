use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use base64::Engine as _;

use crate::error::ApiError;
use crate::AppState;

/// Basic-auth middleware: decodes the Authorization header, verifies the
/// credentials against the external auth collaborator and injects the
/// resulting [`crate::auth::Identity`] into request extensions.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (email, password) = extract_basic_credentials(&headers).map_err(ApiError::unauthorized)?;

    let identity = state.auth.verify(&email, &password).await?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Extract email and password from an `Authorization: Basic` header
fn extract_basic_credentials(headers: &HeaderMap) -> Result<(String, String), String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    let encoded = auth_str
        .strip_prefix("Basic ")
        .ok_or_else(|| "Authorization header must use Basic scheme".to_string())?;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| "Invalid base64 in Authorization header".to_string())?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| "Credentials must be valid UTF-8".to_string())?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| "Credentials must be in email:password form".to_string())?;

    if email.is_empty() {
        return Err("Empty email in credentials".to_string());
    }

    Ok((email.to_string(), password.to_string()))
}
