use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use data_model_blog::models::{PostError, PostPayload};

use crate::state::AppState;

/// Parses the `{id}` path segment. Anything but an integer is a client error, not a miss.
fn parse_post_id(raw: &str) -> Result<i32, PostError> {
    raw.trim().parse::<i32>().map_err(|_| PostError::InvalidId)
}

/// Decodes a post body as JSON whatever its Content-Type. Missing fields are empty strings.
fn parse_payload(body: &[u8]) -> Result<PostPayload, PostError> {
    serde_json::from_slice(body).map_err(|e| PostError::InvalidPayload(e.to_string()))
}

/// POST /api/post - Create a post stamped with the current server time
pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PostError> {
    let payload = parse_payload(&body)?;

    let post = state.posts.create_post(&payload.name, &payload.text).await?;
    tracing::debug!(post_id = post.id, "Created post");

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/post - List every post in id order
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, PostError> {
    let posts = state.posts.list_posts().await?;
    Ok((StatusCode::OK, Json(posts)))
}

/// GET /api/post/{id} - Fetch one post
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PostError> {
    let id = parse_post_id(&id)?;

    match state.posts.get_post(id).await? {
        Some(post) => Ok((StatusCode::OK, Json(post))),
        None => {
            tracing::debug!(post_id = id, "Post not found");
            Err(PostError::NotFound)
        }
    }
}

/// PUT /api/post/{id} - Overwrite name and text, refreshing the date
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, PostError> {
    let id = parse_post_id(&id)?;
    let payload = parse_payload(&body)?;

    let post = state
        .posts
        .update_post(id, &payload.name, &payload.text)
        .await?
        .ok_or(PostError::NotFound)?;
    tracing::debug!(post_id = post.id, "Updated post");

    Ok((StatusCode::OK, Json(post)))
}

/// DELETE /api/post/{id} - Remove a post; deleting a missing post still succeeds
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PostError> {
    let id = parse_post_id(&id)?;

    let existed = state.posts.delete_post(id).await?;
    tracing::debug!(post_id = id, existed, "Deleted post");

    Ok(StatusCode::NO_CONTENT)
}
