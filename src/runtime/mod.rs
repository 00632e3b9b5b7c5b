//! Runtime schema view: admin-configured custom fields per entity.
//!
//! The view is optional infrastructure. A backend that cannot find it reports
//! an error for which [`RuntimeSchemaError::is_missing_view`] holds, and the
//! overlay treats that as "no extra columns".

pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{KongConfig, SchemaBackend};
use crate::errors::{KongError, RuntimeSchemaError};
use crate::store::DbHandle;

pub use rest::RestRuntimeSchema;

pub const RUNTIME_SCHEMA_VIEW: &str = "schema_field_runtime_v";

/// One row of the runtime schema view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFieldRow {
    #[serde(default)]
    pub entity_type: String,
    /// Left as-is from the backend; the overlay trims it and skips blanks.
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default = "default_field_active")]
    pub field_active: bool,
}

fn default_field_active() -> bool {
    true
}

impl RuntimeFieldRow {
    pub fn active(entity_type: &str, column_name: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            column_name: Some(column_name.to_string()),
            field_active: true,
        }
    }

    /// Trimmed, non-empty column name.
    pub fn column(&self) -> Option<&str> {
        self.column_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Read access to the runtime schema view.
///
/// Implementations return only rows with `field_active = true` for the given
/// `entity_type`. One call is one read; nothing is cached between calls.
#[async_trait]
pub trait RuntimeSchemaSource: Send + Sync {
    async fn active_fields(&self, entity_type: &str) -> Result<Vec<RuntimeFieldRow>, RuntimeSchemaError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Custom fields disabled: every lookup yields zero rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRuntimeSchema;

#[async_trait]
impl RuntimeSchemaSource for NoRuntimeSchema {
    async fn active_fields(&self, _entity_type: &str) -> Result<Vec<RuntimeFieldRow>, RuntimeSchemaError> {
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

/// Build the configured runtime schema source.
///
/// Lookups only read: the SQLite backend opens the store read-only and never
/// creates it.
pub fn open_source(config: &KongConfig) -> Result<Arc<dyn RuntimeSchemaSource>, KongError> {
    match config.backend() {
        SchemaBackend::None => Ok(Arc::new(NoRuntimeSchema)),
        SchemaBackend::Sqlite => {
            let handle = DbHandle::open_read_only(&config.sqlite_path()).map_err(KongError::Store)?;
            Ok(Arc::new(handle))
        }
        SchemaBackend::Rest => {
            let section = &config.toml.runtime_schema;
            let url = config.toml.rest_url().ok_or_else(|| {
                KongError::Config("runtime_schema.backend is 'rest' but no rest_url is set".to_string())
            })?;
            let source = RestRuntimeSchema::new(
                &url,
                config.toml.api_key(),
                &section.view,
                Duration::from_secs(section.timeout_secs),
            )?;
            Ok(Arc::new(source))
        }
    }
}
