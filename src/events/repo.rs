use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::debug;

/// Calendar event row. Dates travel as RFC 3339 strings on the wire.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
}

/// Partial update: `None` keeps the stored value, dates are always set.
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, user_id: i64, event: NewEvent) -> anyhow::Result<Event>;
    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Event>>;
    async fn find_by_id(&self, user_id: i64, id: i64) -> anyhow::Result<Option<Event>>;
    async fn update(
        &self,
        user_id: i64,
        id: i64,
        changes: EventChanges,
    ) -> anyhow::Result<Option<Event>>;
    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool>;
}

pub struct PgEventStore {
    db: PgPool,
}

impl PgEventStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, user_id: i64, event: NewEvent) -> anyhow::Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (user_id, title, description, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .fetch_one(&self.db)
        .await?;
        debug!(event_id = %event.id, "event row inserted");
        Ok(event)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, user_id, title, description, start_date, end_date, created_at, updated_at
            FROM events
            WHERE user_id = $1
            ORDER BY start_date ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(events)
    }

    async fn find_by_id(&self, user_id: i64, id: i64) -> anyhow::Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, user_id, title, description, start_date, end_date, created_at, updated_at
            FROM events
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(event)
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        changes: EventChanges,
    ) -> anyhow::Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                start_date = $5,
                end_date = $6,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .fetch_optional(&self.db)
        .await?;
        Ok(event)
    }

    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM events WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory implementation for development and tests.
#[derive(Default)]
pub struct InMemoryEventStore {
    inner: Mutex<EventTable>,
}

#[derive(Default)]
struct EventTable {
    rows: HashMap<i64, Event>,
    next_id: i64,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, user_id: i64, event: NewEvent) -> anyhow::Result<Event> {
        let mut table = self.inner.lock().unwrap();
        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let event = Event {
            id: table.next_id,
            user_id,
            title: event.title,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(event.id, event.clone());
        debug!(event_id = %event.id, "event row inserted in memory");
        Ok(event)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Event>> {
        let table = self.inner.lock().unwrap();
        let mut events: Vec<Event> = table
            .rows
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn find_by_id(&self, user_id: i64, id: i64) -> anyhow::Result<Option<Event>> {
        let table = self.inner.lock().unwrap();
        Ok(table
            .rows
            .get(&id)
            .filter(|e| e.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        changes: EventChanges,
    ) -> anyhow::Result<Option<Event>> {
        let mut table = self.inner.lock().unwrap();
        let Some(event) = table.rows.get_mut(&id).filter(|e| e.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            event.title = title;
        }
        if let Some(description) = changes.description {
            event.description = Some(description);
        }
        event.start_date = changes.start_date;
        event.end_date = changes.end_date;
        event.updated_at = OffsetDateTime::now_utc();
        Ok(Some(event.clone()))
    }

    async fn delete(&self, user_id: i64, id: i64) -> anyhow::Result<bool> {
        let mut table = self.inner.lock().unwrap();
        let owned = table.rows.get(&id).map_or(false, |e| e.user_id == user_id);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn new_event(title: &str, start: OffsetDateTime, end: OffsetDateTime) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: None,
            start_date: start,
            end_date: end,
        }
    }

    #[tokio::test]
    async fn create_then_fetch_roundtrip() {
        let store = InMemoryEventStore::new();
        let created = store
            .create(
                1,
                NewEvent {
                    title: "Dentista".into(),
                    description: Some("Control anual".into()),
                    start_date: datetime!(2026-03-01 10:00 UTC),
                    end_date: datetime!(2026-03-01 11:00 UTC),
                },
            )
            .await
            .expect("create event");

        let fetched = store
            .find_by_id(1, created.id)
            .await
            .expect("find event")
            .expect("event present");
        assert_eq!(fetched.title, "Dentista");
        assert_eq!(fetched.description.as_deref(), Some("Control anual"));
        assert_eq!(fetched.start_date, datetime!(2026-03-01 10:00 UTC));
    }

    #[tokio::test]
    async fn listing_sorts_by_start_date_then_id() {
        let store = InMemoryEventStore::new();
        store
            .create(
                1,
                new_event(
                    "later",
                    datetime!(2026-03-02 10:00 UTC),
                    datetime!(2026-03-02 11:00 UTC),
                ),
            )
            .await
            .expect("create");
        store
            .create(
                1,
                new_event(
                    "earlier",
                    datetime!(2026-03-01 10:00 UTC),
                    datetime!(2026-03-01 11:00 UTC),
                ),
            )
            .await
            .expect("create");
        store
            .create(
                1,
                new_event(
                    "same-start",
                    datetime!(2026-03-01 10:00 UTC),
                    datetime!(2026-03-01 12:00 UTC),
                ),
            )
            .await
            .expect("create");

        let events = store.list_by_user(1).await.expect("list events");
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["earlier", "same-start", "later"]);
    }

    #[tokio::test]
    async fn update_keeps_omitted_fields() {
        let store = InMemoryEventStore::new();
        let created = store
            .create(
                1,
                NewEvent {
                    title: "Reunión".into(),
                    description: Some("Sala 3".into()),
                    start_date: datetime!(2026-03-01 10:00 UTC),
                    end_date: datetime!(2026-03-01 11:00 UTC),
                },
            )
            .await
            .expect("create");

        let updated = store
            .update(
                1,
                created.id,
                EventChanges {
                    title: None,
                    description: None,
                    start_date: datetime!(2026-03-01 14:00 UTC),
                    end_date: datetime!(2026-03-01 15:00 UTC),
                },
            )
            .await
            .expect("update")
            .expect("event present");
        assert_eq!(updated.title, "Reunión");
        assert_eq!(updated.description.as_deref(), Some("Sala 3"));
        assert_eq!(updated.start_date, datetime!(2026-03-01 14:00 UTC));
    }

    #[tokio::test]
    async fn events_are_scoped_to_their_owner() {
        let store = InMemoryEventStore::new();
        let created = store
            .create(
                1,
                new_event(
                    "privado",
                    datetime!(2026-03-01 10:00 UTC),
                    datetime!(2026-03-01 11:00 UTC),
                ),
            )
            .await
            .expect("create");

        assert!(store
            .find_by_id(2, created.id)
            .await
            .expect("find")
            .is_none());
        assert!(store
            .update(
                2,
                created.id,
                EventChanges {
                    title: Some("robado".into()),
                    description: None,
                    start_date: datetime!(2026-03-01 10:00 UTC),
                    end_date: datetime!(2026-03-01 11:00 UTC),
                },
            )
            .await
            .expect("update")
            .is_none());
        assert!(!store.delete(2, created.id).await.expect("delete"));
        assert_eq!(store.list_by_user(1).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_the_event() {
        let store = InMemoryEventStore::new();
        let created = store
            .create(
                1,
                new_event(
                    "borrable",
                    datetime!(2026-03-01 10:00 UTC),
                    datetime!(2026-03-01 11:00 UTC),
                ),
            )
            .await
            .expect("create");

        assert!(store.delete(1, created.id).await.expect("delete"));
        assert!(store
            .find_by_id(1, created.id)
            .await
            .expect("find")
            .is_none());
        assert!(!store.delete(1, created.id).await.expect("second delete"));
    }
}
