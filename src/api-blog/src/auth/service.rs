//! Registration, credential checks and session identity resolution.
//!
//! These functions hold the authentication rules; the handlers only translate HTTP in and out.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_blog::AuthConfig;
use data_model_blog::models::{ErrorResponse, User};
use data_model_blog::store::{StoreError, UserStore};
use tracing::{debug, error};

use super::password::{hash_password, verify_password};
use super::session::{generate_session_token, parse_session_cookie, validate_session_token};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username and wrong password are deliberately the same error
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid form data")]
    InvalidForm(String),

    #[error("Invalid user ID")]
    InvalidUserId,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Password error: {0}")]
    PasswordError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UsernameTaken => AuthError::UsernameTaken,
            _ => AuthError::StorageError(e.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid username or password"),
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::UsernameTaken => (StatusCode::CONFLICT, "Username already taken"),
            AuthError::InvalidForm(reason) => {
                debug!("Rejected auth form: {}", reason);
                (StatusCode::BAD_REQUEST, "Invalid form data")
            }
            AuthError::InvalidUserId => (StatusCode::BAD_REQUEST, "Invalid user ID"),
            AuthError::SessionError(_) | AuthError::PasswordError(_) | AuthError::StorageError(_) => {
                error!("Authentication failure: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Hashes `password` and stores a new user.
pub async fn register(users: &dyn UserStore, config: &AuthConfig, username: &str, password: &str) -> Result<User, AuthError> {
    let password = password.to_string();
    let cost = config.bcrypt_cost;

    // bcrypt is deliberately slow, keep it off the async workers
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AuthError::PasswordError(e.to_string()))?
        .map_err(|e| AuthError::PasswordError(e.to_string()))?;

    let user = users.insert_user(username, &password_hash).await?;
    debug!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Checks credentials and, on success, issues a signed session token for the user.
pub async fn login(
    users: &dyn UserStore,
    config: &AuthConfig,
    username: &str,
    password: &str,
) -> Result<(User, String), AuthError> {
    let Some(user) = users.find_user_by_username(username).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    let password = password.to_string();
    let password_hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AuthError::PasswordError(e.to_string()))?
        .map_err(|e| AuthError::PasswordError(e.to_string()))?;

    if !is_valid {
        return Err(AuthError::InvalidCredentials);
    }

    let token = generate_session_token(user.id, &config.key).map_err(|e| AuthError::SessionError(e.to_string()))?;
    Ok((user, token))
}

/// Reads the session from a Cookie header value and loads its user.
/// Missing, malformed, forged or expired sessions, and sessions whose user is gone,
/// are all `Unauthenticated`.
pub async fn resolve_identity(
    users: &dyn UserStore,
    config: &AuthConfig,
    cookie_header: Option<&str>,
) -> Result<User, AuthError> {
    let token = cookie_header
        .and_then(parse_session_cookie)
        .ok_or(AuthError::Unauthenticated)?;

    let user_id = match validate_session_token(&token, &config.key, config.duration_seconds) {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            debug!("Session signature invalid or expired");
            return Err(AuthError::Unauthenticated);
        }
        Err(e) => {
            debug!("Malformed session token: {}", e);
            return Err(AuthError::Unauthenticated);
        }
    };

    users.find_user_by_id(user_id).await?.ok_or_else(|| {
        debug!(user_id, "Session refers to a user that no longer exists");
        AuthError::Unauthenticated
    })
}
