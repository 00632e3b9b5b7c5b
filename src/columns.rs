//! Column allowlist filter.
//!
//! Keeps only the input keys that are declared, non-virtual columns of the
//! entity and not denied. Everything else is dropped without a report.

use serde_json::{Map, Value};

use kong_common::{EntityKey, schema};

use crate::deny::DenySet;
use crate::errors::KongError;

/// Filtered write payload, handed straight to an insert or update.
pub type ColumnMap = Map<String, Value>;

/// One input slot. `Absent` means the key was sent without a value and is
/// always dropped; `Present(Value::Null)` is an explicit null and is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Absent,
    Present(Value),
}

impl InputValue {
    pub fn as_present(&self) -> Option<&Value> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        Self::Present(value)
    }
}

impl From<Option<Value>> for InputValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

/// Weakly-typed bag of client fields, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteInput {
    entries: Vec<(String, InputValue)>,
}

impl WriteInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a present value, replacing any earlier slot for the key.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), InputValue::Present(value.into()));
        self
    }

    /// Mark a key as sent without a value.
    pub fn set_absent(mut self, key: impl Into<String>) -> Self {
        self.insert(key.into(), InputValue::Absent);
        self
    }

    pub fn insert(&mut self, key: String, value: InputValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Present entries only.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter_map(|(k, v)| v.as_present().map(|v| (k, v)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a JSON document that must be an object. Every key in it is present.
    pub fn from_json(value: Value) -> Result<Self, KongError> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(KongError::input_not_object(&other)),
        }
    }
}

impl From<Map<String, Value>> for WriteInput {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, InputValue::Present(v))).collect()
    }
}

impl<K: Into<String>> FromIterator<(K, InputValue)> for WriteInput {
    fn from_iter<T: IntoIterator<Item = (K, InputValue)>>(iter: T) -> Self {
        let mut input = Self::new();
        for (k, v) in iter {
            input.insert(k.into(), v);
        }
        input
    }
}

/// Copy every present, non-denied entry whose key passes `allowed`.
pub(crate) fn filter_input<F>(input: &WriteInput, deny: &DenySet, allowed: F) -> ColumnMap
where
    F: Fn(&str) -> bool,
{
    let mut out = ColumnMap::new();
    for (key, value) in input.present() {
        if !allowed(key) || deny.contains(key) {
            continue;
        }
        out.insert(key.to_string(), value.clone());
    }
    out
}

/// Static pass: keep declared, non-virtual columns of `entity` not in `deny`.
pub fn pick_entity_columns(entity: EntityKey, input: &WriteInput, deny: &DenySet) -> ColumnMap {
    let entity_schema = schema(entity);
    filter_input(input, deny, |key| entity_schema.has_column(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deny::compose;
    use serde_json::json;

    fn rock_input() -> WriteInput {
        WriteInput::new()
            .set("name", "Rock")
            .set("code", "rk01")
            .set("hacker_field", "x")
            .set("project_id", "p1")
    }

    #[test]
    fn test_asset_scenario_drops_unknown_and_denied() {
        let out = pick_entity_columns(EntityKey::Asset, &rock_input(), &compose(["project_id"]));
        assert_eq!(serde_json::Value::Object(out), json!({"name": "Rock", "code": "rk01"}));
    }

    #[test]
    fn test_id_never_survives() {
        for entity in EntityKey::ALL {
            let input = WriteInput::new().set("id", 5).set("created_at", "now").set("updated_at", "now");
            let out = pick_entity_columns(entity, &input, &DenySet::default());
            assert!(out.is_empty(), "{} kept {:?}", entity, out);
        }
    }

    #[test]
    fn test_absent_values_are_dropped_but_null_is_kept() {
        let input = WriteInput::new()
            .set_absent("name")
            .set("description", Value::Null)
            .set("status", "ip");
        let out = pick_entity_columns(EntityKey::Asset, &input, &DenySet::default());
        assert!(!out.contains_key("name"));
        assert_eq!(out.get("description"), Some(&Value::Null));
        assert_eq!(out.get("status"), Some(&json!("ip")));
    }

    #[test]
    fn test_virtual_fields_are_not_writable() {
        let input = WriteInput::new().set("link", "shot:4").set("name", "comp");
        let out = pick_entity_columns(EntityKey::Task, &input, &DenySet::default());
        assert!(!out.contains_key("link"));
        assert!(out.contains_key("name"));
    }

    #[test]
    fn test_field_ids_are_not_columns() {
        // "asset_name" is the field id; the column is "name".
        let input = WriteInput::new().set("asset_name", "Rock");
        let out = pick_entity_columns(EntityKey::Asset, &input, &DenySet::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_output_keys_subset_of_static_columns_minus_deny() {
        let deny = compose(["project_id", "created_by", "status"]);
        for entity in EntityKey::ALL {
            let cols = schema(entity).columns();
            let mut input = WriteInput::new().set("bogus", 1);
            for col in &cols {
                input = input.set(*col, json!(col));
            }
            input = input.set_absent("code");
            let out = pick_entity_columns(entity, &input, &deny);
            for key in out.keys() {
                assert!(cols.contains(key.as_str()), "{}: {} not a column", entity, key);
                assert!(!deny.contains(key), "{}: {} is denied", entity, key);
            }
            let expected = cols.iter().filter(|c| !deny.contains(c) && **c != "code").count();
            assert_eq!(out.len(), expected, "{}", entity);
        }
    }

    #[test]
    fn test_pick_is_idempotent() {
        let deny = compose(["project_id"]);
        let once = pick_entity_columns(EntityKey::Asset, &rock_input(), &deny);
        let twice = pick_entity_columns(EntityKey::Asset, &WriteInput::from(once.clone()), &deny);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_pick_does_not_mutate_input() {
        let input = rock_input();
        let before = input.clone();
        let _ = pick_entity_columns(EntityKey::Asset, &input, &DenySet::default());
        assert_eq!(input, before);
    }

    #[test]
    fn test_write_input_set_replaces_existing_slot() {
        let input = WriteInput::new().set("name", "a").set_absent("name");
        assert_eq!(input.len(), 1);
        assert_eq!(input.get("name"), Some(&InputValue::Absent));
    }

    #[test]
    fn test_from_json_requires_object() {
        let err = WriteInput::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, KongError::InputNotObject { found: "array" }));

        let input = WriteInput::from_json(json!({"name": "Rock", "keep": null})).unwrap();
        assert_eq!(input.len(), 2);
        assert_eq!(input.get("keep"), Some(&InputValue::Present(Value::Null)));
    }

    #[test]
    fn test_input_value_from_option() {
        assert_eq!(InputValue::from(None::<Value>), InputValue::Absent);
        assert_eq!(InputValue::from(Some(json!(1))), InputValue::Present(json!(1)));
    }
}
