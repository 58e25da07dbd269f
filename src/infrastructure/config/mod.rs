use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::domain::feed::FeedSettings;

pub const DEFAULT_MAX_ITEMS: usize = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    /// Directory holding `<key>.json`, `<key>.xml` and `<key>.lock` per index
    pub rss_dir: PathBuf,
    pub max_items: usize,
    pub truncate_description: bool,
    /// When set, indices without an explicit `rss_active` flag are not recorded
    pub no_auto: bool,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let server_dir = PathBuf::from(
            env::var("DEVPI_SERVER_DIR").unwrap_or_else(|_| ".devpi/server".to_string()),
        );

        let max_items: usize = env::var("RSS_MAX_ITEMS")
            .unwrap_or_else(|_| DEFAULT_MAX_ITEMS.to_string())
            .parse()?;
        if max_items == 0 {
            return Err("RSS_MAX_ITEMS must be at least 1".into());
        }

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            rss_dir: env::var("RSS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| server_dir.join(".rss")),
            max_items,
            truncate_description: parse_flag(env::var("RSS_TRUNCATE_DESC").ok()),
            no_auto: parse_flag(env::var("RSS_NO_AUTO").ok()),
            base_url: env::var("RSS_BASE_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        };

        Ok(config)
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            max_items: self.max_items.max(1),
            truncate_description: self.truncate_description,
            default_active: !self.no_auto,
        }
    }
}

fn parse_flag(value: Option<String>) -> bool {
    value
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}
