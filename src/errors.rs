//! Typed error hierarchy for Kong.
//!
//! - `RuntimeSchemaError`: failures reading the runtime schema view. The
//!   overlay always recovers from these; they never reach a write caller.
//! - `KongError`: configuration, input, and local store failures surfaced
//!   by the CLI and the store.

use thiserror::Error;

use crate::runtime::RUNTIME_SCHEMA_VIEW;

/// PostgREST code for "relation not found in the schema cache".
pub const MISSING_RELATION_CODE: &str = "PGRST205";

/// Errors from a runtime schema lookup.
#[derive(Debug, Error)]
pub enum RuntimeSchemaError {
    /// The backend answered with an error payload.
    #[error("Runtime schema query failed{}: {message}", code_suffix(.code))]
    Query {
        code: Option<String>,
        message: String,
    },

    /// The request never produced a usable answer (connect, timeout, decode).
    #[error("Runtime schema transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

impl RuntimeSchemaError {
    pub fn query(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Query {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// True when the error means the optional runtime view is not provisioned.
    pub fn is_missing_view(&self) -> bool {
        match self {
            Self::Query { code, message } => {
                if code.as_deref() == Some(MISSING_RELATION_CODE) {
                    return true;
                }
                let message = message.to_lowercase();
                message.contains(RUNTIME_SCHEMA_VIEW) || message.contains("does not exist")
            }
            Self::Transport(_) => false,
        }
    }
}

/// Errors surfaced to Kong callers.
#[derive(Debug, Error)]
pub enum KongError {
    #[error(transparent)]
    UnknownEntity(#[from] kong_common::ParseEntityError),

    #[error("Write input must be a JSON object, got {found}")]
    InputNotObject { found: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Runtime schema backend '{backend}' does not support {operation}")]
    UnsupportedBackend {
        backend: String,
        operation: &'static str,
    },

    #[error("Local store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KongError {
    pub fn input_not_object(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        let found = match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Self::InputNotObject { found }
    }
}
