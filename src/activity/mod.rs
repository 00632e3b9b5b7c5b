//! Activity events describing entity writes.
//!
//! Builders here are pure: they turn a write into the events it should
//! produce. Delivery lives in [`dispatcher`], which never lets a sink failure
//! reach the write path. Inbox rows are built in [`notifications`] and ride
//! the same dispatcher.

pub mod dispatcher;
pub mod notifications;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use kong_common::{EntityKey, schema};

pub use dispatcher::{ActivityDispatcher, ActivitySink};
pub use notifications::{Notification, TaskAssignees};

/// Keys never reported as field changes.
pub const EXCLUDED_FIELDS: [&str; 8] = [
    "id",
    "created_at",
    "updated_at",
    "created_by",
    "updated_by",
    "metadata",
    "deleted_at",
    "deleted_by",
];

/// One row of the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub project_id: Option<i64>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub actor_id: Option<String>,
    pub attribute_name: Option<String>,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub field_data_type: Option<String>,
    pub description: String,
    /// Shared by every event produced from the same update.
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    fn base(
        entity: EntityKey,
        entity_id: i64,
        project_id: Option<i64>,
        actor_id: Option<&str>,
        event_type: String,
        description: String,
    ) -> Self {
        Self {
            project_id,
            event_type,
            entity_type: entity.as_str().to_string(),
            entity_id,
            actor_id: actor_id.map(str::to_string),
            attribute_name: None,
            old_value: None,
            new_value: None,
            field_data_type: None,
            description,
            session_id: None,
            created_at: Utc::now(),
        }
    }
}

/// `<entity>_created` carrying the inserted row.
pub fn entity_created(
    entity: EntityKey,
    entity_id: i64,
    project_id: Option<i64>,
    actor_id: Option<&str>,
    new_values: Map<String, Value>,
) -> ActivityEvent {
    let description = format!(
        "Created {} \"{}\"",
        entity.label(),
        display_name(&new_values, entity_id)
    );
    let mut event = ActivityEvent::base(
        entity,
        entity_id,
        project_id,
        actor_id,
        format!("{}_created", entity.as_str()),
        description,
    );
    event.new_value = Some(Value::Object(new_values));
    event
}

/// One event per changed key of `new_values`.
///
/// Keys in [`EXCLUDED_FIELDS`] and keys whose value did not change are
/// skipped. A key missing from `old_values` counts as a change from empty.
pub fn entity_updated(
    entity: EntityKey,
    entity_id: i64,
    project_id: Option<i64>,
    actor_id: Option<&str>,
    old_values: &Map<String, Value>,
    new_values: &Map<String, Value>,
) -> Vec<ActivityEvent> {
    let session_id = Uuid::new_v4().to_string();
    let entity_schema = schema(entity);
    let mut events = Vec::new();

    for (key, new_value) in new_values {
        if EXCLUDED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let old_value = old_values.get(key);
        if old_value.is_some_and(|old| same_value(old, new_value)) {
            continue;
        }

        let event_type = if key == "status" {
            "status_changed".to_string()
        } else {
            format!("{}_updated", entity.as_str())
        };
        let description = format!(
            "Changed {} from \"{}\" to \"{}\"",
            field_label(key),
            format_value(old_value),
            format_value(Some(new_value))
        );
        let data_type = entity_schema
            .field_for_column(key)
            .map(|f| f.data_type)
            .unwrap_or_else(|| json_kind(new_value));

        let mut event =
            ActivityEvent::base(entity, entity_id, project_id, actor_id, event_type, description);
        event.attribute_name = Some(key.clone());
        event.old_value = old_value.cloned();
        event.new_value = Some(new_value.clone());
        event.field_data_type = Some(data_type.to_string());
        event.session_id = Some(session_id.clone());
        events.push(event);
    }
    events
}

/// `<entity>_deleted` carrying the removed row.
pub fn entity_deleted(
    entity: EntityKey,
    entity_id: i64,
    project_id: Option<i64>,
    actor_id: Option<&str>,
    deleted: Map<String, Value>,
) -> ActivityEvent {
    let description = format!(
        "Deleted {} \"{}\"",
        entity.label(),
        display_name(&deleted, entity_id)
    );
    let mut event = ActivityEvent::base(
        entity,
        entity_id,
        project_id,
        actor_id,
        format!("{}_deleted", entity.as_str()),
        description,
    );
    event.old_value = Some(Value::Object(deleted));
    event
}

/// Equality as the stored JSON text would see it: `1` and `1.0` match.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| same_value(v, w)))
        }
        _ => a == b,
    }
}

/// `name`, then `code`, then the numeric id.
fn display_name(values: &Map<String, Value>, entity_id: i64) -> String {
    ["name", "code"]
        .iter()
        .filter_map(|key| values.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| entity_id.to_string())
}

/// `due_date` -> `Due Date`.
fn field_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "empty".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}
