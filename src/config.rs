use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::keywords::{TokenizerKind, DEFAULT_MIN_CHARS, DEFAULT_TOP_K};

/// Upper bound on `keyword_window_days` (roughly a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub tokenizer: TokenizerKind,

    #[serde(default = "default_keyword_window_days")]
    pub keyword_window_days: u32,

    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    #[serde(default = "default_related_limit")]
    pub related_limit: usize,

    #[serde(default = "default_article_keywords")]
    pub article_keywords: usize,

    #[serde(default = "default_min_token_chars")]
    pub min_token_chars: usize,

    #[serde(default)]
    pub extra_stopwords: Vec<String>,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("news-analyzer");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("articles.db").to_string_lossy().to_string()
}

fn default_keyword_window_days() -> u32 {
    7
}

fn default_top_keywords() -> usize {
    DEFAULT_TOP_K
}

fn default_related_limit() -> usize {
    5
}

fn default_article_keywords() -> usize {
    5
}

fn default_min_token_chars() -> usize {
    DEFAULT_MIN_CHARS
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            tokenizer: TokenizerKind::default(),
            keyword_window_days: default_keyword_window_days(),
            top_keywords: default_top_keywords(),
            related_limit: default_related_limit(),
            article_keywords: default_article_keywords(),
            min_token_chars: default_min_token_chars(),
            extra_stopwords: Vec::new(),
            fetch_timeout_secs: default_fetch_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("news-analyzer")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.keyword_window_days > MAX_WINDOW_DAYS {
            return Err(AppError::Config(format!(
                "keyword_window_days must be at most {}",
                MAX_WINDOW_DAYS
            )));
        }
        if self.top_keywords == 0 {
            return Err(AppError::Config("top_keywords must be at least 1".to_string()));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(AppError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
