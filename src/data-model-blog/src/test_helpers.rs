//! Test utilities for the stores
//!
//! This module provides an in-memory store that mirrors the Postgres store's semantics
//! (serial ids that are never reused, unique usernames, server-stamped post dates), plus
//! helpers for the optional Postgres-backed tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel_async::RunQueryDsl;
use tokio::sync::RwLock;

use crate::db::{DbPool, ensure_schema, establish_connection_pool};
use crate::models::{Post, User};
use crate::schema;
use crate::store::{PostStore, StoreError, UserStore};

// =============================================================================
// In-memory store
// =============================================================================

/// Rows keyed by id, with a SERIAL-like id sequence.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Store substitute used by router tests. Implements both store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Table<User>>,
    posts: RwLock<Table<Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored posts, for asserting on side effects.
    pub async fn post_count(&self) -> usize {
        self.posts.read().await.rows.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.rows.values().any(|u| u.username == username) {
            return Err(StoreError::UsernameTaken);
        }

        let user = User {
            id: users.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.rows.get(&id).cloned())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, name: &str, text: &str) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        let post = Post {
            id: posts.next_id(),
            name: name.to_string(),
            text: text.to_string(),
            date: Utc::now(),
        };
        posts.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.posts.read().await.rows.values().cloned().collect())
    }

    async fn get_post(&self, id: i32) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.rows.get(&id).cloned())
    }

    async fn update_post(&self, id: i32, name: &str, text: &str) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts.rows.get_mut(&id).map(|post| {
            post.name = name.to_string();
            post.text = text.to_string();
            post.date = Utc::now();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.posts.write().await.rows.remove(&id).is_some())
    }
}

// =============================================================================
// Database Test Helpers
// =============================================================================

/// Get a connection pool for the test database, with the schema in place.
///
/// Uses the TEST_DATABASE_URL environment variable. Returns `None` when it isn't set.
/// The Postgres-backed tests are `#[ignore]`d and run with `cargo test -- --ignored`.
pub async fn test_db_pool() -> Option<DbPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = establish_connection_pool(&database_url, 4)
        .await
        .expect("Failed to create test database pool - is the test database running?");
    ensure_schema(&pool).await.expect("Failed to create test tables");
    Some(pool)
}

/// Clean all data from the test database
///
/// Deletes every row from both the posts and users tables.
pub async fn clean_test_db(pool: &DbPool) {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    diesel::delete(schema::posts::table)
        .execute(&mut conn)
        .await
        .expect("Failed to clean posts table");

    diesel::delete(schema::users::table)
        .execute(&mut conn)
        .await
        .expect("Failed to clean users table");
}
