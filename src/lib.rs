//! Write-side column projection for Kong entities.
//!
//! Client payloads pass through [`columns::pick_entity_columns`] (static
//! schema only) or [`overlay::pick_entity_columns_for_write`] (static schema
//! plus admin-defined runtime fields) before reaching a table. Deny sets from
//! [`deny::compose`] always include the identity and audit columns.

pub mod activity;
pub mod columns;
pub mod config;
pub mod deny;
pub mod errors;
pub mod logging;
pub mod overlay;
pub mod runtime;
pub mod store;
pub mod writes;

pub use columns::{ColumnMap, InputValue, WriteInput, pick_entity_columns};
pub use deny::{DEFAULT_DENY_COLUMNS, DenySet, compose};
pub use errors::{KongError, RuntimeSchemaError};
pub use kong_common::{EntityKey, EntitySchema, FieldDescriptor, schema};
pub use overlay::pick_entity_columns_for_write;
pub use runtime::{NoRuntimeSchema, RuntimeFieldRow, RuntimeSchemaSource};
pub use writes::{PreparedWrite, WriteKind, WritePreparer};
