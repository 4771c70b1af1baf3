use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::auth::repo::{InMemoryUserStore, PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::events::repo::{EventStore, InMemoryEventStore, PgEventStore};
use crate::settings::repo::{InMemorySettingStore, PgSettingStore, SettingStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub settings: Arc<dyn SettingStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let Some(database_url) = config.database_url.clone() else {
            warn!("DATABASE_URL is not set; using in-memory stores");
            return Ok(Self::in_memory(config));
        };

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing with the current schema");
        }
        info!("connected to postgres");

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgEventStore::new(db.clone())),
            Arc::new(PgSettingStore::new(db)),
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        settings: Arc<dyn SettingStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            users,
            events,
            settings,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryEventStore::new()),
            Arc::new(InMemorySettingStore::new()),
        )
    }
}
