//! Write profiles: per-entity deny sets plus the overlay, wired to activity
//! and notifications.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Map;

use kong_common::EntityKey;

use crate::activity::notifications::{
    self, Notification, TaskAssignees, mention, note_reply, task_assigned, version_uploaded,
};
use crate::activity::{ActivityDispatcher, entity_created, entity_deleted, entity_updated};
use crate::columns::{ColumnMap, WriteInput};
use crate::deny::{DenySet, compose};
use crate::overlay::pick_entity_columns_for_write;
use crate::runtime::RuntimeSchemaSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Insert,
    Update,
}

impl WriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insert" | "create" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            _ => Err(format!("Invalid write kind: '{}'. Expected insert or update", s)),
        }
    }
}

/// Columns a write call-site fills from the session or the route, never
/// from the request body. Defaults are added by [`compose`].
pub fn call_site_deny(entity: EntityKey, kind: WriteKind) -> Vec<&'static str> {
    let mut columns = vec!["created_by", "updated_by"];
    if entity.is_project_scoped() {
        columns.push("project_id");
    }

    match entity {
        EntityKey::PublishedFile => columns.push("published_by"),
        EntityKey::Note | EntityKey::Post | EntityKey::Annotation => columns.push("author_id"),
        EntityKey::PostReaction => columns.push("user_id"),
        _ => {}
    }

    // Identity of an existing row: fixed once inserted.
    if kind == WriteKind::Update {
        match entity {
            EntityKey::Sequence => columns.push("code"),
            EntityKey::Shot => columns.extend(["sequence_id", "code"]),
            EntityKey::Task => columns.extend(["entity_type", "entity_id"]),
            EntityKey::Version => columns.extend(["entity_type", "entity_id", "code"]),
            _ => {}
        }
    }
    columns
}

pub fn deny_for(entity: EntityKey, kind: WriteKind) -> DenySet {
    compose(call_site_deny(entity, kind))
}

/// Filtered payload ready for the backing table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedWrite {
    pub entity: EntityKey,
    pub table: &'static str,
    pub kind: WriteKind,
    pub columns: ColumnMap,
}

/// Runs the write filter for every call-site and reports what was written.
pub struct WritePreparer {
    source: Arc<dyn RuntimeSchemaSource>,
    activity: ActivityDispatcher,
}

impl WritePreparer {
    pub fn new(source: Arc<dyn RuntimeSchemaSource>, activity: ActivityDispatcher) -> Self {
        Self { source, activity }
    }

    pub async fn prepare(&self, entity: EntityKey, kind: WriteKind, input: &WriteInput) -> PreparedWrite {
        let deny = deny_for(entity, kind);
        let columns = pick_entity_columns_for_write(self.source.as_ref(), entity, input, &deny).await;
        PreparedWrite {
            entity,
            table: entity.table(),
            kind,
            columns,
        }
    }

    pub fn record_created(
        &self,
        entity: EntityKey,
        entity_id: i64,
        project_id: Option<i64>,
        actor_id: Option<&str>,
        row: ColumnMap,
    ) {
        self.activity
            .send(vec![entity_created(entity, entity_id, project_id, actor_id, row)]);
    }

    pub fn record_updated(
        &self,
        entity: EntityKey,
        entity_id: i64,
        project_id: Option<i64>,
        actor_id: Option<&str>,
        old_row: &Map<String, serde_json::Value>,
        new_row: &ColumnMap,
    ) {
        self.activity.send(entity_updated(
            entity, entity_id, project_id, actor_id, old_row, new_row,
        ));
    }

    pub fn record_deleted(
        &self,
        entity: EntityKey,
        entity_id: i64,
        project_id: Option<i64>,
        actor_id: Option<&str>,
        row: ColumnMap,
    ) {
        self.activity
            .send(vec![entity_deleted(entity, entity_id, project_id, actor_id, row)]);
    }

    pub fn is_recording(&self) -> bool {
        self.activity.is_enabled()
    }

    // ── Notifications ─────────────────────────────────────────────────

    pub fn notify_task_assigned(
        &self,
        task_id: i64,
        assigned_user_id: &str,
        actor_id: &str,
        project_id: i64,
        task_name: &str,
    ) {
        self.deliver(task_assigned(task_id, assigned_user_id, actor_id, project_id, task_name));
    }

    pub fn notify_mention(
        &self,
        note_id: i64,
        mentioned_user_id: &str,
        actor_id: &str,
        project_id: i64,
        note_text: &str,
    ) {
        self.deliver(mention(note_id, mentioned_user_id, actor_id, project_id, note_text));
    }

    pub fn notify_note_reply(
        &self,
        parent_note_id: i64,
        reply_note_id: i64,
        parent_author_id: Option<&str>,
        reply_author_id: &str,
        project_id: i64,
        note_text: &str,
    ) {
        self.deliver(note_reply(
            parent_note_id,
            reply_note_id,
            parent_author_id,
            reply_author_id,
            project_id,
            note_text,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn notify_status_changed(
        &self,
        entity: EntityKey,
        entity_id: i64,
        project_id: i64,
        actor_id: &str,
        old_status: &str,
        new_status: &str,
        task: &TaskAssignees,
    ) {
        self.deliver(notifications::status_changed(
            entity, entity_id, project_id, actor_id, old_status, new_status, task,
        ));
    }

    pub fn notify_version_uploaded(
        &self,
        version_id: i64,
        task_id: Option<i64>,
        project_id: i64,
        actor_id: &str,
        version_name: &str,
        task: &TaskAssignees,
    ) {
        self.deliver(version_uploaded(
            version_id,
            task_id,
            project_id,
            actor_id,
            version_name,
            task,
        ));
    }

    fn deliver(&self, rows: impl IntoIterator<Item = Notification>) {
        self.activity.notify(rows.into_iter().collect());
    }

    /// Flush pending activity before exit.
    pub async fn shutdown(self) {
        self.activity.shutdown().await;
    }
}
