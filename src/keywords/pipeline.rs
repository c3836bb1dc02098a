use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{Article, KeywordCount};

use super::ranker::{rank, DEFAULT_TOP_K};
use super::stopwords::StopwordFilter;
use super::tokenizer::{SimpleTokenizer, Tokenizer};

/// tokenize → filter → rank over a body of text.
pub struct KeywordPipeline {
    tokenizer: Arc<dyn Tokenizer>,
    filter: StopwordFilter,
    top_k: usize,
}

impl KeywordPipeline {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, filter: StopwordFilter, top_k: usize) -> Self {
        Self {
            tokenizer,
            filter,
            top_k,
        }
    }

    pub fn extract(&self, text: &str, top_k: usize) -> Vec<KeywordCount> {
        let tokens = self.tokenizer.tokenize(text);
        let filtered = self.filter.filter(tokens);
        rank(&filtered, top_k)
    }

    pub fn extract_from_articles(&self, articles: &[Article]) -> Vec<KeywordCount> {
        let text = articles
            .iter()
            .map(Article::combined_text)
            .collect::<Vec<_>>()
            .join(" ");
        self.extract(&text, self.top_k)
    }

    /// Top keywords over articles fetched in the trailing `window_days`.
    pub async fn compute_top_keywords(
        &self,
        repository: &Repository,
        window_days: u32,
    ) -> Result<Vec<KeywordCount>> {
        let cutoff = window_cutoff(Utc::now(), window_days)?;
        self.top_keywords_since(repository, cutoff).await
    }

    pub async fn top_keywords_since(
        &self,
        repository: &Repository,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<KeywordCount>> {
        let articles = repository.get_articles_since(cutoff).await?;
        let keywords = self.extract_from_articles(&articles);
        tracing::debug!(
            articles = articles.len(),
            keywords = keywords.len(),
            %cutoff,
            "Computed top keywords"
        );
        Ok(keywords)
    }
}

/// `now - window_days`, or InvalidInput when that falls outside chrono's range.
pub fn window_cutoff(now: DateTime<Utc>, window_days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "keyword window of {} days is out of range",
                window_days
            ))
        })
}

impl Default for KeywordPipeline {
    fn default() -> Self {
        Self::new(
            Arc::new(SimpleTokenizer),
            StopwordFilter::default(),
            DEFAULT_TOP_K,
        )
    }
}
