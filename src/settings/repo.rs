use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::debug;

/// Per-user preferences row.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub user_id: i64,
    pub language: String,
    pub timezone: String,
    pub location: Option<String>,
    pub time_format: String,
    pub dark_mode: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSetting {
    pub language: String,
    pub timezone: String,
    pub location: Option<String>,
    pub time_format: String,
    pub dark_mode: bool,
}

impl Default for NewSetting {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            timezone: "America/Argentina/Buenos_Aires".to_string(),
            location: None,
            time_format: "24h".to_string(),
            dark_mode: false,
        }
    }
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SettingChanges {
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub location: Option<String>,
    pub time_format: Option<String>,
    pub dark_mode: Option<bool>,
}

#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn create(&self, user_id: i64, setting: NewSetting) -> anyhow::Result<Setting>;
    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Setting>>;
    async fn find_by_id(&self, user_id: i64, id: i64) -> anyhow::Result<Option<Setting>>;
    async fn update(
        &self,
        user_id: i64,
        id: i64,
        changes: SettingChanges,
    ) -> anyhow::Result<Option<Setting>>;
    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool>;
}

pub struct PgSettingStore {
    db: PgPool,
}

impl PgSettingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingStore for PgSettingStore {
    async fn create(&self, user_id: i64, setting: NewSetting) -> anyhow::Result<Setting> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (user_id, language, timezone, location, time_format, dark_mode)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, language, timezone, location, time_format, dark_mode,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&setting.language)
        .bind(&setting.timezone)
        .bind(&setting.location)
        .bind(&setting.time_format)
        .bind(setting.dark_mode)
        .fetch_one(&self.db)
        .await?;
        debug!(setting_id = %setting.id, "setting row inserted");
        Ok(setting)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            r#"
            SELECT id, user_id, language, timezone, location, time_format, dark_mode,
                   created_at, updated_at
            FROM settings
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(settings)
    }

    async fn find_by_id(&self, user_id: i64, id: i64) -> anyhow::Result<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            SELECT id, user_id, language, timezone, location, time_format, dark_mode,
                   created_at, updated_at
            FROM settings
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(setting)
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        changes: SettingChanges,
    ) -> anyhow::Result<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            UPDATE settings
            SET language = COALESCE($3, language),
                timezone = COALESCE($4, timezone),
                location = COALESCE($5, location),
                time_format = COALESCE($6, time_format),
                dark_mode = COALESCE($7, dark_mode),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, language, timezone, location, time_format, dark_mode,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&changes.language)
        .bind(&changes.timezone)
        .bind(&changes.location)
        .bind(&changes.time_format)
        .bind(changes.dark_mode)
        .fetch_optional(&self.db)
        .await?;
        Ok(setting)
    }

    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM settings WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory implementation for development and tests.
#[derive(Default)]
pub struct InMemorySettingStore {
    inner: Mutex<SettingTable>,
}

#[derive(Default)]
struct SettingTable {
    rows: HashMap<i64, Setting>,
    next_id: i64,
}

impl InMemorySettingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingStore for InMemorySettingStore {
    async fn create(&self, user_id: i64, setting: NewSetting) -> anyhow::Result<Setting> {
        let mut table = self.inner.lock().unwrap();
        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let setting = Setting {
            id: table.next_id,
            user_id,
            language: setting.language,
            timezone: setting.timezone,
            location: setting.location,
            time_format: setting.time_format,
            dark_mode: setting.dark_mode,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(setting.id, setting.clone());
        debug!(setting_id = %setting.id, "setting row inserted in memory");
        Ok(setting)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Setting>> {
        let table = self.inner.lock().unwrap();
        let mut settings: Vec<Setting> = table
            .rows
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        settings.sort_by_key(|s| s.id);
        Ok(settings)
    }

    async fn find_by_id(&self, user_id: i64, id: i64) -> anyhow::Result<Option<Setting>> {
        let table = self.inner.lock().unwrap();
        Ok(table
            .rows
            .get(&id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        changes: SettingChanges,
    ) -> anyhow::Result<Option<Setting>> {
        let mut table = self.inner.lock().unwrap();
        let Some(setting) = table.rows.get_mut(&id).filter(|s| s.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(language) = changes.language {
            setting.language = language;
        }
        if let Some(timezone) = changes.timezone {
            setting.timezone = timezone;
        }
        if let Some(location) = changes.location {
            setting.location = Some(location);
        }
        if let Some(time_format) = changes.time_format {
            setting.time_format = time_format;
        }
        if let Some(dark_mode) = changes.dark_mode {
            setting.dark_mode = dark_mode;
        }
        setting.updated_at = OffsetDateTime::now_utc();
        Ok(Some(setting.clone()))
    }

    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool> {
        let mut table = self.inner.lock().unwrap();
        let owned = table.rows.get(&id).map_or(false, |s| s.user_id == user_id);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }
}
