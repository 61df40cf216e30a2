use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use super::RemoteError;
use super::supabase::SupabaseClient;
use crate::core::session::Session;
use crate::core::validation::{sanitize_email, validate_credentials};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Build a session from a GoTrue token response.
pub fn session_from_token(value: Value) -> Result<Session, RemoteError> {
    let token: TokenResponse = serde_json::from_value(value)?;
    Ok(Session {
        user_id: token.user.id,
        email: token.user.email.unwrap_or_default(),
        access_token: token.access_token,
        refresh_token: token.refresh_token,
    })
}

/// Password sign-in. Credentials are sanitized and validated before any
/// request is made.
pub async fn sign_in(
    client: &SupabaseClient,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let email = sanitize_email(email);
    let check = validate_credentials(&email, password);
    if !check.is_valid {
        return Err(AuthError::Validation(check.errors));
    }

    let value = client
        .token_grant("password", json!({ "email": email, "password": password }))
        .await?;
    let session = session_from_token(value)?;
    log::info!("Signed in as {}", session.user_id);
    Ok(session)
}

/// Exchange a stored refresh token for a fresh session.
pub async fn refresh_session(
    client: &SupabaseClient,
    refresh_token: &str,
) -> Result<Session, AuthError> {
    if refresh_token.trim().is_empty() {
        return Err(RemoteError::Unauthenticated.into());
    }
    let value = client
        .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
        .await?;
    Ok(session_from_token(value)?)
}
