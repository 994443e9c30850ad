use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use data_model_blog::models::User;
use tracing::debug;

use super::service::resolve_identity;
use crate::state::AppState;

/// The user resolved from the session cookie, available to handlers behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware to require a valid session
/// Resolves the session cookie to a stored user and attaches it as a request extension,
/// otherwise answers 401
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let cookie_header = request.headers().get(header::COOKIE).and_then(|h| h.to_str().ok());

    match resolve_identity(state.users.as_ref(), &state.auth, cookie_header).await {
        Ok(user) => {
            debug!(user_id = user.id, "Request authenticated");
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(e) => {
            debug!("Request not authenticated: {}", e);
            e.into_response()
        }
    }
}
