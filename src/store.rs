//! Local SQLite store.
//!
//! Backs two seams when no hosted database is configured: the runtime schema
//! view (custom fields) and the activity log with its notifications. The
//! runtime view is optional: `open` creates only the activity tables, and the
//! custom-field tables appear after `provision_runtime_fields`. Until then
//! lookups fail with a missing-view error, exactly like an unprovisioned
//! hosted project.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde_json::Value;

use crate::activity::{ActivityEvent, ActivitySink, Notification};
use crate::errors::RuntimeSchemaError;
use crate::runtime::{RUNTIME_SCHEMA_VIEW, RuntimeFieldRow, RuntimeSchemaSource};

/// Async-safe handle to the local database.
///
/// Wraps `LocalDb` behind `Arc<Mutex>` and runs every access on tokio's
/// blocking pool so SQLite I/O never holds an async worker.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<LocalDb>>,
}

impl DbHandle {
    pub fn new(db: LocalDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(LocalDb::new(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(LocalDb::new_in_memory()?))
    }

    /// Open for runtime field lookups only. See [`LocalDb::open_read_only`].
    pub fn open_read_only(path: &Path) -> Result<Self> {
        Ok(Self::new(LocalDb::open_read_only(path)?))
    }

    /// Run a closure with access to the database on a blocking thread.
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&LocalDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }

    /// Acquire the database synchronously. Startup and tests only.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, LocalDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

pub struct LocalDb {
    conn: Connection,
}

impl LocalDb {
    /// Open (or create) a database at `path` and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.run_migrations().context("Failed to run migrations")?;
        Ok(db)
    }

    /// Open without creating the file or running migrations.
    ///
    /// A database that does not exist yet is replaced by an empty in-memory
    /// one, so lookups report the missing view instead of failing to open.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = if path.exists() {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open {} read-only", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "Local store not created yet");
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?
        };
        Ok(Self { conn })
    }

    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.run_migrations().context("Failed to run migrations")?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS activity_events (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_id INTEGER,
                    event_type TEXT NOT NULL,
                    entity_type TEXT NOT NULL,
                    entity_id INTEGER NOT NULL,
                    actor_id TEXT,
                    attribute_name TEXT,
                    old_value TEXT,
                    new_value TEXT,
                    field_data_type TEXT,
                    description TEXT NOT NULL,
                    session_id TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_activity_entity
                    ON activity_events(entity_type, entity_id);
                CREATE INDEX IF NOT EXISTS idx_activity_project
                    ON activity_events(project_id);

                CREATE TABLE IF NOT EXISTS notifications (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    project_id INTEGER NOT NULL,
                    type TEXT NOT NULL,
                    title TEXT NOT NULL,
                    body TEXT,
                    entity_type TEXT NOT NULL,
                    entity_id INTEGER NOT NULL,
                    actor_id TEXT NOT NULL,
                    metadata TEXT NOT NULL DEFAULT '{}',
                    read_at TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_notifications_user
                    ON notifications(user_id, read_at);
                ",
            )
            .context("Failed to create activity tables")?;
        Ok(())
    }

    // ── Runtime fields ────────────────────────────────────────────────

    /// Create the custom-field table and the runtime view. Safe to re-run.
    pub fn provision_runtime_fields(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "
                CREATE TABLE IF NOT EXISTS schema_field_entities (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    entity_type TEXT NOT NULL,
                    column_name TEXT NOT NULL,
                    field_active INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                    UNIQUE(entity_type, column_name)
                );

                CREATE VIEW IF NOT EXISTS {view} AS
                    SELECT entity_type, column_name, field_active
                    FROM schema_field_entities;
                ",
                view = RUNTIME_SCHEMA_VIEW
            ))
            .context("Failed to provision runtime field tables")?;
        Ok(())
    }

    pub fn is_runtime_provisioned(&self) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'view' AND name = ?1",
                params![RUNTIME_SCHEMA_VIEW],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to inspect sqlite_master")?;
        Ok(found.is_some())
    }

    /// Insert or update a custom field for an entity type.
    pub fn register_runtime_field(
        &self,
        entity_type: &str,
        column_name: &str,
        active: bool,
    ) -> Result<RuntimeFieldRow> {
        let column_name = column_name.trim();
        if column_name.is_empty() {
            bail!("Custom field column name must not be empty");
        }
        if !column_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            bail!(
                "Invalid custom field column '{}': use lowercase letters, digits, and underscores",
                column_name
            );
        }

        self.conn
            .execute(
                "INSERT INTO schema_field_entities (entity_type, column_name, field_active)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(entity_type, column_name)
                 DO UPDATE SET field_active = excluded.field_active, updated_at = datetime('now')",
                params![entity_type, column_name, active],
            )
            .context("Failed to register runtime field")?;

        Ok(RuntimeFieldRow {
            entity_type: entity_type.to_string(),
            column_name: Some(column_name.to_string()),
            field_active: active,
        })
    }

    /// All custom fields, active or not, optionally for one entity type.
    pub fn list_runtime_fields(&self, entity_type: Option<&str>) -> Result<Vec<RuntimeFieldRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT entity_type, column_name, field_active FROM {}
                 WHERE (?1 IS NULL OR entity_type = ?1)
                 ORDER BY entity_type, column_name",
                RUNTIME_SCHEMA_VIEW
            ))
            .context("Failed to query runtime fields")?;
        let rows = stmt
            .query_map(params![entity_type], map_runtime_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read runtime fields")?;
        Ok(rows)
    }

    /// Active rows for one entity type, errors left as SQLite reported them.
    pub fn active_runtime_fields(&self, entity_type: &str) -> rusqlite::Result<Vec<RuntimeFieldRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT entity_type, column_name, field_active FROM {}
             WHERE entity_type = ?1 AND field_active = 1",
            RUNTIME_SCHEMA_VIEW
        ))?;
        let rows = stmt
            .query_map(params![entity_type], map_runtime_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ── Activity events ───────────────────────────────────────────────

    /// Insert a batch atomically: either every event is stored or none is.
    pub fn insert_activity_events(&self, events: &[ActivityEvent]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin activity transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO activity_events (
                        project_id, event_type, entity_type, entity_id, actor_id,
                        attribute_name, old_value, new_value, field_data_type,
                        description, session_id, created_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                )
                .context("Failed to prepare activity insert")?;

            for event in events {
                let old_value = event.old_value.as_ref().map(serde_json::to_string).transpose()?;
                let new_value = event.new_value.as_ref().map(serde_json::to_string).transpose()?;
                stmt.execute(params![
                    event.project_id,
                    event.event_type,
                    event.entity_type,
                    event.entity_id,
                    event.actor_id,
                    event.attribute_name,
                    old_value,
                    new_value,
                    event.field_data_type,
                    event.description,
                    event.session_id,
                    event.created_at.to_rfc3339(),
                ])
                .context("Failed to insert activity event")?;
            }
        }
        tx.commit().context("Failed to commit activity events")?;
        Ok(events.len())
    }

    /// Most recent events first.
    pub fn list_activity_events(
        &self,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ActivityEvent>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT project_id, event_type, entity_type, entity_id, actor_id,
                        attribute_name, old_value, new_value, field_data_type,
                        description, session_id, created_at
                 FROM activity_events
                 WHERE (?1 IS NULL OR entity_type = ?1) AND (?2 IS NULL OR entity_id = ?2)
                 ORDER BY id DESC
                 LIMIT ?3",
            )
            .context("Failed to query activity events")?;

        let rows = stmt
            .query_map(params![entity_type, entity_id, limit as i64], |row| {
                Ok(ActivityRow {
                    project_id: row.get(0)?,
                    event_type: row.get(1)?,
                    entity_type: row.get(2)?,
                    entity_id: row.get(3)?,
                    actor_id: row.get(4)?,
                    attribute_name: row.get(5)?,
                    old_value: row.get(6)?,
                    new_value: row.get(7)?,
                    field_data_type: row.get(8)?,
                    description: row.get(9)?,
                    session_id: row.get(10)?,
                    created_at: row.get(11)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read activity events")?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(row.into_event()?);
        }
        Ok(events)
    }

    // ── Notifications ─────────────────────────────────────────────────

    /// Insert a batch atomically.
    pub fn insert_notifications(&self, notifications: &[Notification]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin notification transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO notifications (
                        user_id, project_id, type, title, body, entity_type,
                        entity_id, actor_id, metadata, created_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .context("Failed to prepare notification insert")?;

            for n in notifications {
                stmt.execute(params![
                    n.user_id,
                    n.project_id,
                    n.kind,
                    n.title,
                    n.body,
                    n.entity_type,
                    n.entity_id,
                    n.actor_id,
                    serde_json::to_string(&n.metadata)?,
                    n.created_at.to_rfc3339(),
                ])
                .context("Failed to insert notification")?;
            }
        }
        tx.commit().context("Failed to commit notifications")?;
        Ok(notifications.len())
    }

    /// Most recent first, optionally for one recipient.
    pub fn list_notifications(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<Notification>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_id, project_id, type, title, body, entity_type,
                        entity_id, actor_id, metadata, created_at
                 FROM notifications
                 WHERE (?1 IS NULL OR user_id = ?1)
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .context("Failed to query notifications")?;

        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(NotificationRow {
                    user_id: row.get(0)?,
                    project_id: row.get(1)?,
                    kind: row.get(2)?,
                    title: row.get(3)?,
                    body: row.get(4)?,
                    entity_type: row.get(5)?,
                    entity_id: row.get(6)?,
                    actor_id: row.get(7)?,
                    metadata: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read notifications")?;

        let mut notifications = Vec::with_capacity(rows.len());
        for row in rows {
            notifications.push(row.into_notification()?);
        }
        Ok(notifications)
    }
}

struct NotificationRow {
    user_id: String,
    project_id: i64,
    kind: String,
    title: String,
    body: Option<String>,
    entity_type: String,
    entity_id: i64,
    actor_id: String,
    metadata: String,
    created_at: String,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification> {
        let metadata: Value =
            serde_json::from_str(&self.metadata).context("Invalid stored notification metadata")?;
        Ok(Notification {
            user_id: self.user_id,
            project_id: self.project_id,
            kind: self.kind,
            title: self.title,
            body: self.body,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            actor_id: self.actor_id,
            metadata,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .context("Invalid stored timestamp")?
        .with_timezone(&Utc))
}

/// `activity_events` row as stored: JSON values and timestamps are text.
struct ActivityRow {
    project_id: Option<i64>,
    event_type: String,
    entity_type: String,
    entity_id: i64,
    actor_id: Option<String>,
    attribute_name: Option<String>,
    old_value: Option<String>,
    new_value: Option<String>,
    field_data_type: Option<String>,
    description: String,
    session_id: Option<String>,
    created_at: String,
}

impl ActivityRow {
    fn into_event(self) -> Result<ActivityEvent> {
        let old_value = match self.old_value.as_deref() {
            Some(raw) => Some(serde_json::from_str(raw).context("Invalid stored old_value")?),
            None => None,
        };
        let new_value = match self.new_value.as_deref() {
            Some(raw) => Some(serde_json::from_str(raw).context("Invalid stored new_value")?),
            None => None,
        };
        let created_at = parse_timestamp(&self.created_at)?;

        Ok(ActivityEvent {
            project_id: self.project_id,
            event_type: self.event_type,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            actor_id: self.actor_id,
            attribute_name: self.attribute_name,
            old_value,
            new_value,
            field_data_type: self.field_data_type,
            description: self.description,
            session_id: self.session_id,
            created_at,
        })
    }
}

fn map_runtime_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RuntimeFieldRow> {
    Ok(RuntimeFieldRow {
        entity_type: row.get(0)?,
        column_name: row.get(1)?,
        field_active: row.get(2)?,
    })
}

fn sqlite_query_error(err: &rusqlite::Error) -> RuntimeSchemaError {
    RuntimeSchemaError::Query {
        code: err.sqlite_error_code().map(|c| format!("{:?}", c)),
        message: err.to_string(),
    }
}

#[async_trait]
impl RuntimeSchemaSource for DbHandle {
    async fn active_fields(&self, entity_type: &str) -> Result<Vec<RuntimeFieldRow>, RuntimeSchemaError> {
        let entity_type = entity_type.to_string();
        match self
            .call(move |db| Ok(db.active_runtime_fields(&entity_type)))
            .await
        {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(e)) => Err(sqlite_query_error(&e)),
            Err(e) => Err(RuntimeSchemaError::Transport(e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[async_trait]
impl ActivitySink for DbHandle {
    async fn record(&self, events: Vec<ActivityEvent>) -> Result<()> {
        self.call(move |db| db.insert_activity_events(&events).map(|_| ()))
            .await
    }

    async fn notify(&self, notifications: Vec<Notification>) -> Result<()> {
        self.call(move |db| db.insert_notifications(&notifications).map(|_| ()))
            .await
    }
}
