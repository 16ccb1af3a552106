//! TOML-based configuration.
//!
//! Supports a config file (datalens.toml) with environment variable
//! expansion. Every section has defaults, so the service runs without any
//! config file at all.
//!
//! Example configuration:
//! ```toml
//! [database]
//! path = "./database.db"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//!
//! [summarizer]
//! endpoint = "https://api.example.com/v1/chat/completions"
//! api_key = "${SUMMARIZER_API_KEY}"
//! model = "gpt-4o-mini"
//! max_tokens = 100
//! timeout_seconds = 30
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database location.
    pub database: DatabaseSettings,

    /// HTTP server binding.
    pub server: ServerSettings,

    /// External summarizer. Absent section disables summarization.
    pub summarizer: Option<SummarizerSettings>,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database.db"),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Summarizer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerSettings {
    /// Full URL of the chat-completions endpoint (supports `${ENV_VAR}`
    /// expansion).
    pub endpoint: String,

    /// API key sent as a bearer token (supports `${ENV_VAR}` expansion).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum response length.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Client timeout bounding each summarization call.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    100
}

fn default_timeout_seconds() -> u64 {
    30
}

impl SummarizerSettings {
    /// Resolve `${ENV_VAR}` references in endpoint and api_key.
    pub fn resolved(&self) -> Result<Self, SettingsError> {
        Ok(Self {
            endpoint: expand_env_vars(&self.endpoint)?,
            api_key: self
                .api_key
                .as_deref()
                .map(expand_env_vars)
                .transpose()?,
            ..self.clone()
        })
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DATALENS_CONFIG`
    /// 2. `./datalens.toml`
    /// 3. `~/.config/datalens/config.toml`
    ///
    /// Falls back to defaults when no config file is found.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("DATALENS_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("datalens.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("datalens").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&ch) = chars.peek() {
            if braced && ch == '}' {
                chars.next();
                break;
            }
            if !braced && !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            var_name.push(ch);
            chars.next();
        }

        if var_name.is_empty() {
            // A lone $ stays literal.
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
