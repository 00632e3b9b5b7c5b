//! Runtime field overlay.
//!
//! Widens the static allowlist with the active custom fields the runtime
//! schema view reports for the entity. Lookup failures never reach the
//! caller: a missing view is expected and only traced at debug level, any
//! other failure is logged as an error, and both fall back to the static
//! result.

use std::collections::BTreeSet;

use kong_common::{EntityKey, schema};
use tracing::{debug, error};

use crate::columns::{ColumnMap, WriteInput, filter_input};
use crate::deny::DenySet;
use crate::runtime::RuntimeSchemaSource;

/// Write-path filter: static columns plus active runtime columns, minus `deny`.
///
/// Performs exactly one lookup against `source` per call.
pub async fn pick_entity_columns_for_write<S>(
    source: &S,
    entity: EntityKey,
    input: &WriteInput,
    deny: &DenySet,
) -> ColumnMap
where
    S: RuntimeSchemaSource + ?Sized,
{
    let static_schema = schema(entity);
    let runtime = runtime_columns(source, entity).await;

    filter_input(input, deny, |key| {
        static_schema.has_column(key) || runtime.contains(key)
    })
}

/// Active runtime columns for `entity`, empty on any lookup failure.
pub async fn runtime_columns<S>(source: &S, entity: EntityKey) -> BTreeSet<String>
where
    S: RuntimeSchemaSource + ?Sized,
{
    let entity_type = entity.runtime_entity_type();
    match source.active_fields(entity_type).await {
        Ok(rows) => rows
            .iter()
            .filter(|row| row.field_active)
            .filter_map(|row| row.column())
            .map(str::to_string)
            .collect(),
        Err(err) if err.is_missing_view() => {
            debug!(
                backend = source.backend_name(),
                entity_type, "Runtime schema view unavailable; using static columns"
            );
            BTreeSet::new()
        }
        Err(err) => {
            error!(
                backend = source.backend_name(),
                entity_type,
                error = %err,
                "Failed to load runtime schema fields"
            );
            BTreeSet::new()
        }
    }
}
