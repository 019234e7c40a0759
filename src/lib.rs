//! NFL stat ingestion
//!
//! Walks the paginated nfl.com stat tables, coerces each row into a typed
//! record, backfills the players those tables link to, and stores everything
//! in SQLite for the downstream passing-yards predictor.

pub mod data;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use data::{
    Category, CategoryNormalizer, Database, EntityReference, HttpSource, MemorySource,
    PageResult, PageSource, Pipeline, PlayerResolver,
};

/// Application-wide errors
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Site root that relative links are resolved against
    pub root_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// First season to ingest
    pub start_year: u16,
    /// Season after the last one to ingest
    pub end_year: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scrape: ScrapeConfig::default(),
            data: DataConfig {
                database_path: "data/nfl.db".to_string(),
            },
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        let current_year = chrono::Utc::now().year() as u16;

        ScrapeConfig {
            root_url: "https://www.nfl.com".to_string(),
            user_agent: "gridiron/0.1".to_string(),
            timeout_secs: 30,
            start_year: 2015,
            end_year: current_year,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StatsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| StatsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StatsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
