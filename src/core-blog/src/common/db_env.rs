use serde::Deserialize;

use data_model_blog::db::{ConnectionPoolError, DbPool, ensure_schema, establish_connection_pool};

/// The `[database]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Postgres connection string. DATABASE_URL overrides it.
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    8
}

/// Connects to the configured database and creates the tables if needed.
/// Fails if the database is unreachable, so callers can abort at startup.
pub async fn get_db_pool(config: &DatabaseConfig) -> Result<DbPool, ConnectionPoolError> {
    let pool = establish_connection_pool(&config.url, config.max_connections).await?;
    ensure_schema(&pool).await?;
    tracing::info!(max_connections = config.max_connections, "Database connection pool ready");
    Ok(pool)
}
