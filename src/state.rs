use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthService, TokenKeys};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{MemoryStore, PgStore, TaskStore, UserStore};
use crate::tasks::TaskService;

/// Shared services handed to every worker as actix app data.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskService>,
    pub keys: web::Data<TokenKeys>,
}

impl AppState {
    /// Connects the configured store (running migrations for Postgres) and builds the
    /// services on top of it.
    pub async fn init(config: &Config) -> Result<Self, AppError> {
        let keys = TokenKeys::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.jwt_expiration_hours),
        );

        if config.uses_memory_store() {
            log::warn!("using the in-memory store; data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            return Self::from_parts(store.clone(), store, keys, config.bcrypt_cost);
        }

        let store = Arc::new(
            PgStore::connect(&config.database_url, config.database_max_connections).await?,
        );
        Self::from_parts(store.clone(), store, keys, config.bcrypt_cost)
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        keys: TokenKeys,
        bcrypt_cost: u32,
    ) -> Result<Self, AppError> {
        let auth = AuthService::new(users, keys.clone(), bcrypt_cost)?;
        Ok(Self {
            auth: web::Data::new(auth),
            tasks: web::Data::new(TaskService::new(tasks)),
            keys: web::Data::new(keys),
        })
    }

    /// Registers the services as app data.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.tasks.clone())
            .app_data(self.keys.clone());
    }
}
