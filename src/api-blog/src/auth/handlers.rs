use axum::{
    Extension, Form, Json,
    extract::{Path, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use data_model_blog::models::{CredentialsForm, MessageResponse};
use std::time::Instant;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use super::middleware::CurrentUser;
use super::service::{self, AuthError};
use super::session::{create_logout_cookie, create_session_cookie, parse_session_cookie, validate_session_token};
use crate::state::AppState;

/// POST /api/register
/// Creates an account from form fields `username` and `password`
pub async fn post_register(
    State(state): State<AppState>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Form(credentials) = form.map_err(|e| AuthError::InvalidForm(e.body_text()))?;

    service::register(
        state.users.as_ref(),
        &state.auth,
        &credentials.username,
        &credentials.password,
    )
    .await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Registration successful"))))
}

/// POST /api/login
/// Authenticates a user and sets the session cookie, enforcing the configured minimum response time
pub async fn post_login(
    State(state): State<AppState>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let start = Instant::now();
    let Form(credentials) = form.map_err(|e| AuthError::InvalidForm(e.body_text()))?;

    let outcome = service::login(
        state.users.as_ref(),
        &state.auth,
        &credentials.username,
        &credentials.password,
    )
    .await;

    // Ensure minimum elapsed time (timing attack protection)
    let min_duration = Duration::from_millis(state.auth.min_login_millis);
    let elapsed = start.elapsed();
    if elapsed < min_duration {
        sleep(min_duration - elapsed).await;
    }

    let (user, token) = outcome.inspect_err(|e| {
        if matches!(e, AuthError::InvalidCredentials) {
            warn!("Failed login attempt");
        }
    })?;

    let cookie = create_session_cookie(&token, state.auth.duration_seconds);

    debug!(user_id = user.id, "Successful login");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(MessageResponse::new("Login successful")),
    ))
}

/// POST /api/logout
/// Clears the session cookie. Succeeds whether or not a session was present.
pub async fn post_logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let session_user = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_session_cookie)
        .and_then(|token| validate_session_token(&token, &state.auth.key, state.auth.duration_seconds).ok())
        .flatten();

    match session_user {
        Some(user_id) => debug!(user_id, "User logged out"),
        None => debug!("Logout without an active session"),
    }

    let cookie = create_logout_cookie();

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(MessageResponse::new("Logout successful")),
    )
}

/// GET /{user_id}/
/// Greets the signed-in user. The path id must be the session's own user id.
pub async fn get_home(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    let user_id: i32 = user_id.parse().map_err(|_| AuthError::InvalidUserId)?;

    if user_id != user.id {
        debug!(session_user = user.id, requested = user_id, "Session does not match requested user");
        return Err(AuthError::Unauthenticated);
    }

    Ok(Json(MessageResponse::new(format!("Hello, {}!", user.username))))
}
