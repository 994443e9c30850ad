use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};

pub type PoolError = deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>;

pub type DbPool = Pool<AsyncPgConnection>;

/// Idempotent DDL for the credential and post tables.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    text TEXT NOT NULL,
    date TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionPoolError {
    #[error("Failed to build connection pool: {0}")]
    BuildError(#[from] deadpool::managed::BuildError),
    #[error("Failed to establish initial database connection: {0}")]
    ConnectionError(#[from] PoolError),
    #[error("Failed to create tables: {0}")]
    SchemaError(#[from] diesel::result::Error),
}

pub async fn establish_connection_pool(database_url: &str, max_size: usize) -> Result<DbPool, ConnectionPoolError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(config).max_size(max_size).build()?;

    // Force an initial connection to validate the database is reachable
    // This ensures we fail fast if the DB is unavailable
    let _conn = pool.get().await?;

    Ok(pool)
}

/// Creates the `users` and `posts` tables if they don't exist yet.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), ConnectionPoolError> {
    let mut conn = pool.get().await?;
    conn.batch_execute(SCHEMA_SQL).await?;
    tracing::debug!("Database schema is ready");
    Ok(())
}
