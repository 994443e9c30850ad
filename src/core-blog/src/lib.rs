pub mod common;

pub use common::auth_config::AuthConfig;
pub use common::config::{AppConfig, ConfigError, config_path, load_config};
pub use common::db_env::{DatabaseConfig, get_db_pool};
pub use common::health::health_check;
pub use common::hostname::{HostPortError, ServerConfig};
pub use common::logging::{DEFAULT_LOG_SETTINGS, setup_logging};
