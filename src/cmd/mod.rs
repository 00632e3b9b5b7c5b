//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled         |
//! |-------------|--------------------------|
//! | `pick`      | `Pick`, `Prepare`        |
//! | `schema`    | `Schema`                 |
//! | `fields`    | `Fields`                 |
//! | `activity`  | `Activity`               |
//! | `config`    | `Config`                 |

pub mod activity;
pub mod config;
pub mod fields;
pub mod pick;
pub mod schema;

pub use activity::cmd_activity;
pub use config::cmd_config;
pub use fields::cmd_fields;
pub use pick::{cmd_pick, cmd_prepare};
pub use schema::cmd_schema;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use kong::config::KongConfig;
use kong::errors::KongError;
use kong::store::DbHandle;
use kong::{EntityKey, WriteInput};

pub(crate) fn parse_entity(name: &str) -> Result<EntityKey> {
    Ok(name.parse::<EntityKey>().map_err(KongError::from)?)
}

/// Read a JSON object from `path`, or stdin when `None`.
pub(crate) fn read_json_object(path: Option<&Path>) -> Result<serde_json::Map<String, serde_json::Value>> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            buf
        }
    };
    let value: serde_json::Value =
        serde_json::from_str(&content).context("Input is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(KongError::input_not_object(&other).into()),
    }
}

pub(crate) fn read_input(path: Option<&Path>) -> Result<WriteInput> {
    Ok(WriteInput::from(read_json_object(path)?))
}

/// Local SQLite store holding custom fields and the activity log.
pub(crate) fn open_local_store(config: &KongConfig) -> Result<DbHandle> {
    let path = config.sqlite_path();
    tracing::debug!(path = %path.display(), "Opening local store");
    DbHandle::open(&path).map_err(|e| KongError::Store(e).into())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
