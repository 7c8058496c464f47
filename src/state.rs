use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::database::Store;

/// Shared, read-only request context handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: JwtManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt: JwtManager, config: Arc<AppConfig>) -> Self {
        Self { store, jwt, config }
    }
}
