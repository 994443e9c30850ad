pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;
pub mod session;

pub use handlers::{get_home, post_login, post_logout, post_register};
pub use middleware::{CurrentUser, require_auth};
pub use service::AuthError;
