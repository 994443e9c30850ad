use std::sync::Arc;

use core_blog::AuthConfig;
use data_model_blog::store::{PostStore, UserStore};

/// Everything a handler needs, built once at startup and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, posts: Arc<dyn PostStore>, auth: AuthConfig) -> Self {
        Self {
            users,
            posts,
            auth: Arc::new(auth),
        }
    }

    /// Uses one store for both the credential and post tables.
    pub fn with_store<S>(store: Arc<S>, auth: AuthConfig) -> Self
    where
        S: UserStore + PostStore + 'static,
    {
        Self::new(store.clone(), store, auth)
    }
}
