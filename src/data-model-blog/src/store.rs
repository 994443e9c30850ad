//! Credential and post persistence.
//!
//! Handlers only see the [`UserStore`] and [`PostStore`] traits, so the same router runs
//! against Postgres in production and against the in-memory store in tests.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;

use crate::db::{DbPool, PoolError};
use crate::models::{NewUser, Post, PostWrite, User};
use crate::schema::{posts, users};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Username already taken")]
    UsernameTaken,
}

/// Credential Store: the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user whose password has already been hashed.
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
}

/// Post Store: the `posts` table. Every write stamps `date` with the current server time.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, name: &str, text: &str) -> Result<Post, StoreError>;

    /// All posts in ascending id order.
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;

    async fn get_post(&self, id: i32) -> Result<Option<Post>, StoreError>;

    /// Returns `None` when no row has the given id.
    async fn update_post(&self, id: i32, name: &str, text: &str) -> Result<Option<Post>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_post(&self, id: i32) -> Result<bool, StoreError>;
}

/// Postgres-backed store sharing one connection pool for both tables.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut conn = self.pool.get().await?;

        let inserted = diesel::insert_into(users::table)
            .values(&NewUser {
                username,
                password_hash,
            })
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(StoreError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;

        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;

        let user = users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, name: &str, text: &str) -> Result<Post, StoreError> {
        let mut conn = self.pool.get().await?;

        let post = diesel::insert_into(posts::table)
            .values(&PostWrite {
                name,
                text,
                date: Utc::now(),
            })
            .returning(Post::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let mut conn = self.pool.get().await?;

        let all_posts = posts::table
            .order(posts::id.asc())
            .select(Post::as_select())
            .load::<Post>(&mut conn)
            .await?;

        Ok(all_posts)
    }

    async fn get_post(&self, id: i32) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().await?;

        let post = posts::table
            .find(id)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(post)
    }

    async fn update_post(&self, id: i32, name: &str, text: &str) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().await?;

        let post = diesel::update(posts::table.find(id))
            .set(&PostWrite {
                name,
                text,
                date: Utc::now(),
            })
            .returning(Post::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        Ok(post)
    }

    async fn delete_post(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(posts::table.find(id)).execute(&mut conn).await?;

        Ok(deleted > 0)
    }
}
