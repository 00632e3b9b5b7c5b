//! Runtime schema view over a PostgREST-style HTTP endpoint.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{RuntimeFieldRow, RuntimeSchemaSource};
use crate::errors::RuntimeSchemaError;

/// Error payload returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Reads `entity_type`/`column_name` rows from the hosted runtime view.
///
/// The request timeout lives on the HTTP client; the overlay adds no retry
/// or timeout of its own.
#[derive(Debug, Clone)]
pub struct RestRuntimeSchema {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    view: String,
}

impl RestRuntimeSchema {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        view: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kong/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for runtime schema")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            view: view.to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.view)
    }

    fn query_params(entity_type: &str) -> [(&'static str, String); 3] {
        [
            ("select", "entity_type,column_name,field_active".to_string()),
            ("entity_type", format!("eq.{}", entity_type)),
            ("field_active", "eq.true".to_string()),
        ]
    }
}

#[async_trait]
impl RuntimeSchemaSource for RestRuntimeSchema {
    async fn active_fields(&self, entity_type: &str) -> Result<Vec<RuntimeFieldRow>, RuntimeSchemaError> {
        let mut request = self
            .client
            .get(self.endpoint())
            .header("Accept", "application/json")
            .query(&Self::query_params(entity_type));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send runtime schema request")
            .map_err(RuntimeSchemaError::Transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read runtime schema response body")
            .map_err(RuntimeSchemaError::Transport)?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        let value: Value = serde_json::from_str(&body)
            .context("Failed to parse runtime schema response")
            .map_err(RuntimeSchemaError::Transport)?;
        rows_from_json(value, entity_type)
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}

/// Map a non-2xx response onto a query error, keeping the PostgREST code.
fn parse_error_body(status: u16, body: &str) -> RuntimeSchemaError {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError {
            code,
            message: Some(message),
            details,
        }) => {
            let message = match details {
                Some(details) if !details.is_empty() => format!("{} ({})", message, details),
                _ => message,
            };
            RuntimeSchemaError::Query { code, message }
        }
        _ => RuntimeSchemaError::query(None, format!("HTTP {}: {}", status, body.trim())),
    }
}

/// Decode rows leniently: a row whose `column_name` is not a string keeps
/// `None` instead of failing the whole response.
fn rows_from_json(value: Value, entity_type: &str) -> Result<Vec<RuntimeFieldRow>, RuntimeSchemaError> {
    let Value::Array(items) = value else {
        return Err(RuntimeSchemaError::Transport(anyhow::anyhow!(
            "Expected a JSON array from the runtime schema view"
        )));
    };

    Ok(items
        .iter()
        .map(|item| RuntimeFieldRow {
            entity_type: item
                .get("entity_type")
                .and_then(Value::as_str)
                .unwrap_or(entity_type)
                .to_string(),
            column_name: item
                .get("column_name")
                .and_then(Value::as_str)
                .map(str::to_string),
            field_active: item
                .get("field_active")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        })
        .collect())
}
