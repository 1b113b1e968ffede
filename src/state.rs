use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db;
use crate::movies::repo::{MemoryMovieStore, MovieStore, PgMovieStore};
use crate::users::repo::{MemoryUserStore, PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub movies: Arc<dyn MovieStore>,
}

impl AppState {
    /// Connects to Postgres and migrates when `DATABASE_URL` is set,
    /// otherwise falls back to the in-memory stores.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            return Ok(Self::in_memory(config));
        };

        let pool = db::connect(&config, &url).await?;
        db::migrate(&pool).await?;
        info!("database ready");

        Ok(Self {
            users: Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
            movies: Arc::new(PgMovieStore::new(pool)) as Arc<dyn MovieStore>,
            config,
        })
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            users: Arc::new(MemoryUserStore::default()),
            movies: Arc::new(MemoryMovieStore::default()),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::in_memory(config)
    }
}
