use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Backing file for the key-value store; `None` keeps it in memory.
    pub data_path: Option<PathBuf>,
    pub page_size: usize,
    pub simulated_latency_ms: u64,
    pub max_image_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_path: std::env::var("QUILL_DATA_PATH").ok().map(PathBuf::from),
            page_size: env_or_parse("QUILL_PAGE_SIZE", "10")?,
            simulated_latency_ms: env_or_parse("QUILL_LATENCY_MS", "0")?,
            max_image_bytes: env_or_parse("QUILL_MAX_IMAGE_BYTES", "5242880")?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            page_size: 10,
            simulated_latency_ms: 0,
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = env_or(key, default);
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
