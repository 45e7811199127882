use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::ranking::VocabularyScope;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub max_documents: usize,
    pub processing_timeout_secs: u64,
    pub session_capacity: usize,
    /// When set, uploaded documents are written here instead of kept in memory.
    pub upload_dir: Option<PathBuf>,
    pub vocabulary_scope: VocabularyScope,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_documents: 50,
            processing_timeout_secs: 60,
            session_capacity: 64,
            upload_dir: None,
            vocabulary_scope: VocabularyScope::Reference,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_documents: parse_env("MAX_DOCUMENTS", defaults.max_documents)?,
            processing_timeout_secs: parse_env(
                "PROCESSING_TIMEOUT_SECS",
                defaults.processing_timeout_secs,
            )?,
            session_capacity: parse_env("SESSION_CAPACITY", defaults.session_capacity)?,
            upload_dir: std::env::var("UPLOAD_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            vocabulary_scope: parse_env("VOCABULARY_SCOPE", defaults.vocabulary_scope)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
