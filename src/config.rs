//! Configuration for Kong, read from `kong.toml`.
//!
//! Layered file → environment → CLI. Every section is optional; a missing
//! file yields defaults (static schema only, activity enabled, `warn` logs).
//!
//! # Configuration File Format
//!
//! ```toml
//! [runtime_schema]
//! backend = "rest"            # none | sqlite | rest
//! view = "schema_field_runtime_v"
//! rest_url = "https://project.supabase.co"
//! timeout_secs = 10
//! # sqlite_path = ".kong/kong.db"
//!
//! [activity]
//! enabled = true
//!
//! [logging]
//! level = "warn"
//! format = "text"             # text | json
//! ```
//!
//! Environment overrides: `KONG_REST_URL`, `KONG_API_KEY`, `KONG_LOG`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::RUNTIME_SCHEMA_VIEW;

pub const CONFIG_FILE_NAME: &str = "kong.toml";

/// Where custom fields are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaBackend {
    /// Static columns only
    #[default]
    None,
    /// Local SQLite store
    Sqlite,
    /// Hosted PostgREST endpoint
    Rest,
}

impl std::fmt::Display for SchemaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaBackend::None => write!(f, "none"),
            SchemaBackend::Sqlite => write!(f, "sqlite"),
            SchemaBackend::Rest => write!(f, "rest"),
        }
    }
}

impl std::str::FromStr for SchemaBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SchemaBackend::None),
            "sqlite" => Ok(SchemaBackend::Sqlite),
            "rest" => Ok(SchemaBackend::Rest),
            _ => anyhow::bail!(
                "Invalid runtime schema backend '{}'. Valid values: none, sqlite, rest",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSchemaSection {
    #[serde(default)]
    pub backend: SchemaBackend,
    /// Name of the runtime view (REST backend)
    #[serde(default = "default_view")]
    pub view: String,
    /// SQLite database file, relative to the config file
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
    #[serde(default)]
    pub rest_url: Option<String>,
    /// Prefer `KONG_API_KEY`; a key here is reported by `validate`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_view() -> String {
    RUNTIME_SCHEMA_VIEW.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RuntimeSchemaSection {
    fn default() -> Self {
        Self {
            backend: SchemaBackend::default(),
            view: default_view(),
            sqlite_path: None,
            rest_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySection {
    #[serde(default = "default_activity_enabled")]
    pub enabled: bool,
}

fn default_activity_enabled() -> bool {
    true
}

impl Default for ActivitySection {
    fn default() -> Self {
        Self {
            enabled: default_activity_enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// The complete kong.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KongToml {
    #[serde(default)]
    pub runtime_schema: RuntimeSchemaSection,
    #[serde(default)]
    pub activity: ActivitySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl KongToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse kong.toml")
    }

    /// Defaults when `path` does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize kong.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// REST base URL (env → file).
    pub fn rest_url(&self) -> Option<String> {
        std::env::var("KONG_REST_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.runtime_schema.rest_url.clone())
    }

    /// API key (env → file).
    pub fn api_key(&self) -> Option<String> {
        std::env::var("KONG_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.runtime_schema.api_key.clone())
    }

    /// Log level (env → file).
    pub fn log_level(&self) -> String {
        std::env::var("KONG_LOG")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.logging.level.clone())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let section = &self.runtime_schema;

        if section.backend == SchemaBackend::Rest {
            match self.rest_url() {
                None => warnings.push(
                    "runtime_schema.backend is 'rest' but no rest_url or KONG_REST_URL is set"
                        .to_string(),
                ),
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    warnings.push(format!("Invalid rest_url '{}': expected http(s) URL", url))
                }
                Some(_) => {}
            }
        }

        if section.backend != SchemaBackend::Rest && section.rest_url.is_some() {
            warnings.push(format!(
                "rest_url is set but backend is '{}'; it will be ignored",
                section.backend
            ));
        }

        if section.api_key.is_some() {
            warnings.push("api_key is stored in kong.toml; prefer KONG_API_KEY".to_string());
        }

        if section.view.is_empty()
            || !section
                .view
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            warnings.push(format!("Invalid runtime view name '{}'", section.view));
        }

        if section.timeout_secs == 0 {
            warnings.push("runtime_schema.timeout_secs is 0; requests will fail immediately".to_string());
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            warnings.push(format!(
                "Invalid logging.level '{}'. Valid values: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        warnings
    }
}

/// Resolved configuration with its source location.
///
/// Lookup order: `--config`, `$KONG_CONFIG`, `./kong.toml`, then
/// `<user config dir>/kong/kong.toml`. The first existing file wins; an
/// explicitly named file must exist.
#[derive(Debug, Clone)]
pub struct KongConfig {
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
    pub toml: KongToml,
    /// CLI override for the runtime schema backend
    pub cli_backend: Option<SchemaBackend>,
}

impl KongConfig {
    pub fn discover(cli_path: Option<&Path>) -> Result<Self> {
        let explicit = cli_path.map(Path::to_path_buf).or_else(|| {
            std::env::var("KONG_CONFIG")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });

        if let Some(path) = explicit {
            let toml = KongToml::load(&path)?;
            return Ok(Self::from_file(path, toml));
        }

        for candidate in default_locations() {
            if candidate.exists() {
                let toml = KongToml::load(&candidate)?;
                return Ok(Self::from_file(candidate, toml));
            }
        }

        Ok(Self {
            path: None,
            toml: KongToml::default(),
            cli_backend: None,
        })
    }

    fn from_file(path: PathBuf, toml: KongToml) -> Self {
        Self {
            path: Some(path),
            toml,
            cli_backend: None,
        }
    }

    pub fn with_cli_backend(mut self, backend: Option<SchemaBackend>) -> Self {
        self.cli_backend = backend;
        self
    }

    /// Backend (CLI → file → default).
    pub fn backend(&self) -> SchemaBackend {
        self.cli_backend.unwrap_or(self.toml.runtime_schema.backend)
    }

    /// SQLite file. Relative paths resolve against the config file's
    /// directory; with no file, against the working directory.
    pub fn sqlite_path(&self) -> PathBuf {
        let configured = self
            .toml
            .runtime_schema
            .sqlite_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".kong").join("kong.db"));
        if configured.is_absolute() {
            return configured;
        }
        match self.path.as_deref().and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(configured),
            _ => configured,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("kong").join(CONFIG_FILE_NAME));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Run `f` with the given variables set, restoring previous values.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = vars
            .iter()
            .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
            .collect();
        for (k, v) in vars {
            match v {
                Some(v) => unsafe { std::env::set_var(k, v) },
                None => unsafe { std::env::remove_var(k) },
            }
        }
        f();
        for (k, v) in saved {
            match v {
                Some(v) => unsafe { std::env::set_var(&k, v) },
                None => unsafe { std::env::remove_var(&k) },
            }
        }
    }

    #[test]
    fn test_parse_empty_gives_defaults() {
        let toml = KongToml::parse("").unwrap();
        assert_eq!(toml.runtime_schema.backend, SchemaBackend::None);
        assert_eq!(toml.runtime_schema.view, "schema_field_runtime_v");
        assert_eq!(toml.runtime_schema.timeout_secs, 10);
        assert!(toml.activity.enabled);
        assert_eq!(toml.logging.level, "warn");
        assert_eq!(toml.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
[runtime_schema]
backend = "rest"
rest_url = "https://example.supabase.co"
timeout_secs = 3

[activity]
enabled = false

[logging]
level = "debug"
format = "json"
"#;
        let toml = KongToml::parse(content).unwrap();
        assert_eq!(toml.runtime_schema.backend, SchemaBackend::Rest);
        assert_eq!(toml.runtime_schema.timeout_secs, 3);
        assert!(!toml.activity.enabled);
        assert_eq!(toml.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_rejects_unknown_backend() {
        let err = KongToml::parse("[runtime_schema]\nbackend = \"mongo\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("kong.toml"));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("SQLite".parse::<SchemaBackend>().unwrap(), SchemaBackend::Sqlite);
        assert!("mongo".parse::<SchemaBackend>().is_err());
        assert_eq!(SchemaBackend::Rest.to_string(), "rest");
    }

    #[test]
    fn test_validate_default_is_clean() {
        with_env(&[("KONG_REST_URL", None)], || {
            assert!(KongToml::default().validate().is_empty());
        });
    }

    #[test]
    fn test_validate_rest_without_url() {
        with_env(&[("KONG_REST_URL", None)], || {
            let toml = KongToml::parse("[runtime_schema]\nbackend = \"rest\"\n").unwrap();
            let warnings = toml.validate();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains("no rest_url"));
        });
    }

    #[test]
    fn test_validate_rest_url_from_env_counts() {
        with_env(&[("KONG_REST_URL", Some("https://env.example"))], || {
            let toml = KongToml::parse("[runtime_schema]\nbackend = \"rest\"\n").unwrap();
            assert!(toml.validate().is_empty());
            assert_eq!(toml.rest_url().as_deref(), Some("https://env.example"));
        });
    }

    #[test]
    fn test_validate_flags_bad_values() {
        with_env(&[("KONG_REST_URL", None)], || {
            let content = r#"
[runtime_schema]
backend = "rest"
rest_url = "ftp://nope"
api_key = "secret"
view = "bad view"
timeout_secs = 0

[logging]
level = "loud"
"#;
            let warnings = KongToml::parse(content).unwrap().validate();
            assert_eq!(warnings.len(), 5, "{:?}", warnings);
        });
    }

    #[test]
    fn test_env_overrides_file_values() {
        with_env(
            &[("KONG_API_KEY", Some("env-key")), ("KONG_LOG", Some("debug"))],
            || {
                let content = "[runtime_schema]\napi_key = \"file-key\"\n[logging]\nlevel = \"error\"\n";
                let toml = KongToml::parse(content).unwrap();
                assert_eq!(toml.api_key().as_deref(), Some("env-key"));
                assert_eq!(toml.log_level(), "debug");
            },
        );
        with_env(&[("KONG_API_KEY", None), ("KONG_LOG", None)], || {
            let toml = KongToml::parse("[logging]\nlevel = \"error\"\n").unwrap();
            assert_eq!(toml.api_key(), None);
            assert_eq!(toml.log_level(), "error");
        });
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kong.toml");

        let mut toml = KongToml::default();
        toml.runtime_schema.backend = SchemaBackend::Sqlite;
        toml.logging.level = "info".to_string();
        toml.save(&path).unwrap();

        let loaded = KongToml::load(&path).unwrap();
        assert_eq!(loaded.runtime_schema.backend, SchemaBackend::Sqlite);
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let toml = KongToml::load_or_default(&dir.path().join("kong.toml")).unwrap();
        assert_eq!(toml.runtime_schema.backend, SchemaBackend::None);
    }

    #[test]
    fn test_discover_explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        assert!(KongConfig::discover(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_discover_prefers_cli_over_env() {
        let dir = tempdir().unwrap();
        let cli = dir.path().join("cli.toml");
        let env = dir.path().join("env.toml");
        std::fs::write(&cli, "[runtime_schema]\nbackend = \"sqlite\"\n").unwrap();
        std::fs::write(&env, "[runtime_schema]\nbackend = \"rest\"\n").unwrap();

        let env_str = env.to_string_lossy().to_string();
        with_env(&[("KONG_CONFIG", Some(env_str.as_str()))], || {
            let from_cli = KongConfig::discover(Some(&cli)).unwrap();
            assert_eq!(from_cli.backend(), SchemaBackend::Sqlite);
            assert_eq!(from_cli.path.as_deref(), Some(cli.as_path()));

            let from_env = KongConfig::discover(None).unwrap();
            assert_eq!(from_env.backend(), SchemaBackend::Rest);
        });
    }

    #[test]
    fn test_cli_backend_overrides_file() {
        let config = KongConfig {
            path: None,
            toml: KongToml::default(),
            cli_backend: None,
        }
        .with_cli_backend(Some(SchemaBackend::Sqlite));
        assert_eq!(config.backend(), SchemaBackend::Sqlite);
    }

    #[test]
    fn test_sqlite_path_resolves_against_config_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kong.toml");
        let mut toml = KongToml::default();
        toml.runtime_schema.sqlite_path = Some(PathBuf::from("data/fields.db"));
        let config = KongConfig {
            path: Some(path),
            toml,
            cli_backend: None,
        };
        assert_eq!(config.sqlite_path(), dir.path().join("data/fields.db"));

        let bare = KongConfig {
            path: None,
            toml: KongToml::default(),
            cli_backend: None,
        };
        assert_eq!(bare.sqlite_path(), PathBuf::from(".kong/kong.db"));
    }
}
