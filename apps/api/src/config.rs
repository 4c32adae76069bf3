use anyhow::{bail, Context, Result};

use crate::llm_client::sanitize_api_key;
use crate::normalize::korean_price::DEFAULT_USD_KRW_RATE;

/// Where listings are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local map; listings vanish on restart.
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    /// Required only for `StorageBackend::Postgres`.
    pub database_url: Option<String>,
    pub openai_api_key: String,
    /// Overrides the chat-completions endpoint (compatible proxies).
    pub openai_api_url: Option<String>,
    /// KRW per USD for dollar prices.
    pub usd_krw_rate: f64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage = parse_storage(std::env::var("STORAGE").ok().as_deref())?;
        let database_url = std::env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("Required environment variable 'DATABASE_URL' is not set (or set STORAGE=memory)");
        }

        let openai_api_key = sanitize_api_key(&require_env("OPENAI_API_KEY")?);
        if openai_api_key.is_empty() {
            bail!("OPENAI_API_KEY is empty after removing invalid characters");
        }

        Ok(Config {
            storage,
            database_url,
            openai_api_key,
            openai_api_url: std::env::var("OPENAI_API_URL").ok(),
            usd_krw_rate: parse_rate(std::env::var("USD_KRW_RATE").ok().as_deref())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_storage(raw: Option<&str>) -> Result<StorageBackend> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("postgres") => Ok(StorageBackend::Postgres),
        Some("memory") => Ok(StorageBackend::Memory),
        Some(other) => bail!("STORAGE must be 'postgres' or 'memory', got '{other}'"),
    }
}

fn parse_rate(raw: Option<&str>) -> Result<f64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_USD_KRW_RATE);
    };
    let rate = raw
        .trim()
        .parse::<f64>()
        .context("USD_KRW_RATE must be a number")?;
    if !rate.is_finite() || rate <= 0.0 {
        bail!("USD_KRW_RATE must be positive");
    }
    Ok(rate)
}
