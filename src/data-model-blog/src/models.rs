use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

// users table model (database representation)
/// A registered account. The password column only ever holds a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    #[diesel(column_name = password)]
    pub password_hash: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    #[diesel(column_name = password)]
    pub password_hash: &'a str,
}

// posts table model (database representation)
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub name: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Column values written on both insert and update; `date` is always server time.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::posts)]
pub struct PostWrite<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub date: DateTime<Utc>,
}

// API Payload Types

/// JSON body for creating or updating a post. Absent fields decode as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
}

/// Form body for POST /api/register and POST /api/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Response payload carrying a human readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response payload for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Error for the /api/post endpoints
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// The id path segment is not an integer
    #[error("Invalid post ID")]
    InvalidId,
    /// The JSON body could not be decoded into a post
    #[error("Invalid request payload")]
    InvalidPayload(String),
    /// No post has the requested id
    #[error("Post not found")]
    NotFound,
    /// Storage failure; the detail is logged, never returned
    #[error("Internal server error")]
    Unknown(String),
}

macro_rules! from_error {
    ($lib_err:path, $err_type:tt) => {
        /// Converts a `$lib_err` into an `$err_type::Unknown`.
        impl From<$lib_err> for $err_type {
            fn from(e: $lib_err) -> Self {
                $err_type::Unknown(format!("{:?}", e))
            }
        }
    };
}

from_error!(StoreError, PostError);

impl IntoResponse for PostError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            PostError::InvalidId | PostError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            PostError::NotFound => StatusCode::NOT_FOUND,
            PostError::Unknown(detail) => {
                tracing::error!("Post storage failure: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if let PostError::InvalidPayload(reason) = &self {
            tracing::debug!("Rejected post payload: {}", reason);
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
