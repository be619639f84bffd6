use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api_client::DEFAULT_TIMEOUT;
use crate::notifications::DEFAULT_NOTIFICATION_CAP;
use crate::settings::DEFAULT_API_URL;

/// Client configuration loaded from environment variables.
/// Every variable is optional; malformed numbers fail startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    /// Settings and the current-project pointer are kept in memory when unset.
    pub storage_path: Option<PathBuf>,
    pub notification_cap: usize,
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            api_url: lookup("NELL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            storage_path: lookup("NELL_STORAGE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            notification_cap: parse_or(
                &lookup,
                "NELL_NOTIFICATION_CAP",
                DEFAULT_NOTIFICATION_CAP,
            )?,
            request_timeout_secs: parse_or(
                &lookup,
                "NELL_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
    }
}
