use std::collections::BTreeSet;

use serde::Serialize;

use crate::entity::EntityKey;
use crate::generated;

/// One field of an entity as declared in the generated schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Stable field code (slug of the display name).
    pub id: &'static str,
    /// Display name from the CSV export.
    pub name: &'static str,
    /// ShotGrid data type (`text`, `entity`, `multi_entity`, ...).
    pub data_type: &'static str,
    /// Backing column, `None` when the field has no storage of its own.
    pub column: Option<&'static str>,
    /// Computed or display-only; never accepted on write.
    pub is_virtual: bool,
}

impl FieldDescriptor {
    pub const fn column(
        id: &'static str,
        name: &'static str,
        data_type: &'static str,
        column: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            data_type,
            column: Some(column),
            is_virtual: false,
        }
    }

    /// A field represented elsewhere (e.g. the polymorphic `entity_type` +
    /// `entity_id` pair behind a "Link" field).
    pub const fn virtual_field(id: &'static str, name: &'static str, data_type: &'static str) -> Self {
        Self {
            id,
            name,
            data_type,
            column: None,
            is_virtual: true,
        }
    }

    /// The column this field accepts on write, if any.
    pub fn writable_column(&self) -> Option<&'static str> {
        if self.is_virtual { None } else { self.column }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntitySchema {
    pub entity: EntityKey,
    pub table: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl EntitySchema {
    /// Declared, non-virtual columns.
    pub fn columns(&self) -> BTreeSet<&'static str> {
        self.fields
            .iter()
            .filter_map(FieldDescriptor::writable_column)
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.writable_column() == Some(column))
    }

    pub fn field(&self, id: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// The field stored in `column`, if the column is declared.
    pub fn field_for_column(&self, column: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.writable_column() == Some(column))
    }

    pub fn virtual_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.writable_column().is_none())
    }
}

/// Look up the compiled-in schema for an entity.
pub fn schema(entity: EntityKey) -> &'static EntitySchema {
    match entity {
        EntityKey::Asset => &generated::ASSET,
        EntityKey::Sequence => &generated::SEQUENCE,
        EntityKey::Shot => &generated::SHOT,
        EntityKey::Task => &generated::TASK,
        EntityKey::Version => &generated::VERSION,
        EntityKey::Note => &generated::NOTE,
        EntityKey::PublishedFile => &generated::PUBLISHED_FILE,
        EntityKey::Post => &generated::POST,
        EntityKey::PostMedia => &generated::POST_MEDIA,
        EntityKey::PostReaction => &generated::POST_REACTION,
        EntityKey::Annotation => &generated::ANNOTATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_has_a_schema() {
        for entity in EntityKey::ALL {
            let s = schema(entity);
            assert_eq!(s.entity, entity);
            assert_eq!(s.table, entity.table());
            assert!(!s.fields.is_empty(), "{} has no fields", entity);
        }
    }

    #[test]
    fn test_columns_are_unique_within_entity() {
        for entity in EntityKey::ALL {
            let s = schema(entity);
            let declared: Vec<_> = s.fields.iter().filter_map(|f| f.column).collect();
            let unique: BTreeSet<_> = declared.iter().copied().collect();
            assert_eq!(declared.len(), unique.len(), "duplicate column in {}", entity);
        }
    }

    #[test]
    fn test_virtual_fields_have_no_column() {
        for entity in EntityKey::ALL {
            for field in schema(entity).fields {
                if field.is_virtual {
                    assert!(field.column.is_none(), "{}.{}", entity, field.id);
                }
            }
        }
    }

    #[test]
    fn test_link_fields_are_virtual() {
        let task = schema(EntityKey::Task);
        let link = task.field("link").expect("task link field");
        assert!(link.is_virtual);
        assert_eq!(link.writable_column(), None);
        assert!(!task.columns().contains("link"));

        let published = schema(EntityKey::PublishedFile);
        assert!(published.field("link").is_some_and(|f| f.is_virtual));
    }

    #[test]
    fn test_asset_columns_include_core_fields() {
        let cols = schema(EntityKey::Asset).columns();
        for expected in ["name", "code", "asset_type", "status", "id", "project_id"] {
            assert!(cols.contains(expected), "asset missing {}", expected);
        }
        assert!(schema(EntityKey::Asset).has_column("tags"));
        assert!(!schema(EntityKey::Asset).has_column("hacker_field"));
    }

    #[test]
    fn test_published_file_maps_created_by_to_published_by() {
        let s = schema(EntityKey::PublishedFile);
        let field = s.field("created_by").expect("created_by field");
        assert_eq!(field.column, Some("published_by"));
    }

    #[test]
    fn test_virtual_field_iterator() {
        let ids: Vec<_> = schema(EntityKey::Task).virtual_fields().map(|f| f.id).collect();
        assert_eq!(ids, vec!["link"]);
        assert_eq!(schema(EntityKey::Asset).virtual_fields().count(), 0);
    }

    #[test]
    fn test_field_for_column_resolves_storage_name() {
        let asset = schema(EntityKey::Asset);
        let field = asset.field_for_column("name").expect("name column");
        assert_eq!(field.id, "asset_name");
        assert_eq!(field.name, "Asset Name");
        assert!(asset.field_for_column("link").is_none());
        assert!(schema(EntityKey::Task).field_for_column("link").is_none());
    }
}
