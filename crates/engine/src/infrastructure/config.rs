//! Engine configuration from the environment.
//!
//! `.env.local` and `.env` at the repository root are loaded first (if
//! present), then the process environment is read.

use std::path::{Path, PathBuf};

/// Default tracing filter when neither `LOREKEEP_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "lorekeep_engine=info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be `true` or `false`, got `{value}`")]
    InvalidBool { key: &'static str, value: String },
    #[error("{0} is not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// JSON snapshot backing the repositories
    pub snapshot_path: Option<PathBuf>,
    pub log_filter: String,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            pretty: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let snapshot_path = non_empty("LOREKEEP_SNAPSHOT").map(PathBuf::from);
        let log_filter = non_empty("LOREKEEP_LOG")
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let pretty = match non_empty("LOREKEEP_PRETTY") {
            Some(value) => parse_bool("LOREKEEP_PRETTY", &value)?,
            None => true,
        };

        Ok(Self {
            snapshot_path,
            log_filter,
            pretty,
        })
    }

    pub fn require_snapshot_path(&self) -> Result<&Path, ConfigError> {
        self.snapshot_path
            .as_deref()
            .ok_or(ConfigError::Missing("LOREKEEP_SNAPSHOT"))
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

/// Load `.env.local` then `.env` from the repository root, if they exist.
pub fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
