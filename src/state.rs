use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{MemoryUserStore, PgUserStore, UserStore},
        services::Credentials,
    },
    config::AppConfig,
    db,
};

pub const MEMORY_STORE_URL: &str = "memory://";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Credentials,
    pub keys: JwtKeys,
    db: Option<PgPool>,
}

impl AppState {
    /// Opens the user store named by `database_url` and runs migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        if config.database_url.starts_with(MEMORY_STORE_URL) {
            warn!("using in-memory user store; accounts are lost on restart");
            return Ok(Self::from_parts(
                Arc::new(config),
                Arc::new(MemoryUserStore::new()),
            ));
        }

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        let store = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
        let mut state = Self::from_parts(Arc::new(config), store);
        state.db = Some(pool);
        Ok(state)
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> Self {
        let keys = JwtKeys::from(&config.jwt);
        Self {
            config,
            credentials: Credentials::new(store),
            keys,
            db: None,
        }
    }

    /// Releases the store connection; called once the server has stopped.
    pub async fn close(&self) {
        if let Some(pool) = &self.db {
            pool.close().await;
            info!("database pool closed");
        }
    }
}
