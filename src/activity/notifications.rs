//! Inbox notifications raised alongside activity events.
//!
//! Builders are pure, like the activity builders: the caller looks up the
//! recipients (parent note author, task assignees) and the builder decides
//! who gets a row. The actor never notifies themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use kong_common::EntityKey;

/// Longest note excerpt carried in a notification body.
pub const PREVIEW_CHARS: usize = 200;

/// One row of the `notifications` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient.
    pub user_id: String,
    pub project_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub entity_type: String,
    pub entity_id: i64,
    pub actor_id: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[allow(clippy::too_many_arguments)]
    fn new(
        user_id: &str,
        project_id: i64,
        kind: &str,
        title: String,
        entity_type: &str,
        entity_id: i64,
        actor_id: &str,
        metadata: Value,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            project_id,
            kind: kind.to_string(),
            title,
            body: None,
            entity_type: entity_type.to_string(),
            entity_id,
            actor_id: actor_id.to_string(),
            metadata,
            created_at: Utc::now(),
        }
    }

    fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// Users attached to a task: explicit assignments plus `assigned_to`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskAssignees {
    pub task_name: Option<String>,
    users: Vec<String>,
}

impl TaskAssignees {
    /// Assignment rows first, then `assigned_to` if it is not already listed.
    pub fn new(
        task_name: Option<&str>,
        assignments: impl IntoIterator<Item = String>,
        assigned_to: Option<&str>,
    ) -> Self {
        let mut users: Vec<String> = Vec::new();
        for user in assignments.into_iter().chain(assigned_to.map(str::to_string)) {
            if !user.is_empty() && !users.contains(&user) {
                users.push(user);
            }
        }
        Self {
            task_name: task_name.filter(|n| !n.is_empty()).map(str::to_string),
            users,
        }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    fn excluding<'a>(&'a self, actor_id: &'a str) -> impl Iterator<Item = &'a String> {
        self.users.iter().filter(move |user| user.as_str() != actor_id)
    }
}

pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

pub fn task_assigned(
    task_id: i64,
    assigned_user_id: &str,
    actor_id: &str,
    project_id: i64,
    task_name: &str,
) -> Option<Notification> {
    if assigned_user_id == actor_id {
        return None;
    }
    Some(Notification::new(
        assigned_user_id,
        project_id,
        "task_assigned",
        format!("You were assigned to task \"{}\"", task_name),
        EntityKey::Task.as_str(),
        task_id,
        actor_id,
        json!({ "task_name": task_name }),
    ))
}

pub fn mention(
    note_id: i64,
    mentioned_user_id: &str,
    actor_id: &str,
    project_id: i64,
    note_text: &str,
) -> Option<Notification> {
    if mentioned_user_id == actor_id {
        return None;
    }
    let excerpt = preview(note_text);
    Some(
        Notification::new(
            mentioned_user_id,
            project_id,
            "mention",
            "You were mentioned in a note".to_string(),
            EntityKey::Note.as_str(),
            note_id,
            actor_id,
            json!({ "note_preview": excerpt }),
        )
        .with_body(excerpt),
    )
}

/// Notify the parent note's author. `parent_author_id` is `None` when the
/// parent has no author or could not be found.
pub fn note_reply(
    parent_note_id: i64,
    reply_note_id: i64,
    parent_author_id: Option<&str>,
    reply_author_id: &str,
    project_id: i64,
    note_text: &str,
) -> Option<Notification> {
    let recipient = parent_author_id.filter(|id| !id.is_empty())?;
    if recipient == reply_author_id {
        return None;
    }
    let excerpt = preview(note_text);
    Some(
        Notification::new(
            recipient,
            project_id,
            "note_reply",
            "Someone replied to your note".to_string(),
            EntityKey::Note.as_str(),
            reply_note_id,
            reply_author_id,
            json!({ "parent_note_id": parent_note_id, "note_preview": excerpt }),
        )
        .with_body(excerpt),
    )
}

/// One row per task assignee other than the actor. Only tasks notify.
pub fn status_changed(
    entity: EntityKey,
    entity_id: i64,
    project_id: i64,
    actor_id: &str,
    old_status: &str,
    new_status: &str,
    task: &TaskAssignees,
) -> Vec<Notification> {
    if entity != EntityKey::Task {
        return Vec::new();
    }
    let (label, name_value) = match &task.task_name {
        Some(name) => (name.clone(), Value::from(name.as_str())),
        None => (entity_id.to_string(), Value::from(entity_id)),
    };

    task.excluding(actor_id)
        .map(|user| {
            Notification::new(
                user,
                project_id,
                "status_changed",
                format!(
                    "Task \"{}\" status changed from \"{}\" to \"{}\"",
                    label, old_status, new_status
                ),
                entity.as_str(),
                entity_id,
                actor_id,
                json!({
                    "old_status": old_status,
                    "new_status": new_status,
                    "task_name": name_value,
                }),
            )
        })
        .collect()
}

/// One row per assignee of the version's task other than the actor.
/// Versions not linked to a task notify nobody.
pub fn version_uploaded(
    version_id: i64,
    task_id: Option<i64>,
    project_id: i64,
    actor_id: &str,
    version_name: &str,
    task: &TaskAssignees,
) -> Vec<Notification> {
    let Some(task_id) = task_id else {
        return Vec::new();
    };
    task.excluding(actor_id)
        .map(|user| {
            Notification::new(
                user,
                project_id,
                "version_uploaded",
                format!("New version \"{}\" uploaded", version_name),
                EntityKey::Version.as_str(),
                version_id,
                actor_id,
                json!({ "version_name": version_name, "task_id": task_id }),
            )
        })
        .collect()
}
