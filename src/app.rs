use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::keywords::{KeywordPipeline, StopwordFilter};
use crate::models::{Article, KeywordCount};
use crate::services::{HttpPageFetcher, PageFetcher, ScrapeIngestor};

/// Operations offered to whatever sits in front of the store: the CLI here,
/// an HTTP layer elsewhere.
pub struct App {
    repository: Repository,
    fetcher: Arc<dyn PageFetcher>,
    ingestor: ScrapeIngestor,
    pipeline: Arc<KeywordPipeline>,
    window_days: u32,
    related_limit: usize,
    max_concurrent_fetches: usize,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
        Ok(Self::from_parts(config, repository, Arc::new(fetcher)))
    }

    pub fn from_parts(
        config: &Config,
        repository: Repository,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let filter = StopwordFilter::with_extra(&config.extra_stopwords, config.min_token_chars);
        let pipeline = Arc::new(KeywordPipeline::new(
            config.tokenizer.build(),
            filter,
            config.top_keywords,
        ));
        let ingestor = ScrapeIngestor::new(
            repository.clone(),
            Arc::clone(&pipeline),
            config.article_keywords,
        );

        Self {
            repository,
            fetcher,
            ingestor,
            pipeline,
            window_days: config.keyword_window_days,
            related_limit: config.related_limit,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        self.repository.get_all_articles().await
    }

    pub async fn article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let url = require("url", url)?;
        self.repository.find_by_url(url).await
    }

    /// Fetch `url` once and store what was extracted.
    pub async fn submit_url(&self, url: &str) -> Result<Article> {
        let url = require("url", url)?;
        let page = self.fetcher.fetch(url).await?;
        self.ingestor
            .ingest(url, &page.title, &page.paragraph_text)
            .await
    }

    /// Submit several URLs with a bounded number of fetches in flight. Results
    /// come back in input order; one failure does not stop the rest.
    pub async fn submit_urls(&self, urls: Vec<String>) -> Vec<(String, Result<Article>)> {
        stream::iter(urls)
            .map(|url| async move {
                let result = self.submit_url(&url).await;
                if let Err(e) = &result {
                    tracing::warn!("Failed to ingest {}: {}", url, e);
                }
                (url, result)
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await
    }

    /// Top keywords over the trailing window; `None` uses the configured window.
    pub async fn top_keywords(&self, window_days: Option<u32>) -> Result<Vec<KeywordCount>> {
        let days = window_days.unwrap_or(self.window_days);
        self.pipeline
            .compute_top_keywords(&self.repository, days)
            .await
    }

    /// Most recent articles mentioning `keyword`, capped at the related limit.
    pub async fn related_articles(&self, keyword: &str) -> Result<Vec<Article>> {
        let keyword = require("keyword", keyword)?;
        self.repository
            .search_articles(keyword, Some(self.related_limit))
            .await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
        let query = require("query", query)?;
        self.repository.search_articles(query, None).await
    }

    pub async fn delete_article(&self, id: i64) -> Result<()> {
        self.repository.delete_article(id).await?;
        tracing::info!(id, "Deleted article");
        Ok(())
    }
}

fn require<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", name)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use crate::services::FetchedPage;

    /// Serves canned pages; unknown URLs fail like an unreachable host.
    #[derive(Default)]
    struct StubFetcher {
        pages: Mutex<HashMap<String, FetchedPage>>,
    }

    impl StubFetcher {
        fn serve(&self, url: &str, title: &str, text: &str) {
            self.pages.lock().unwrap().insert(
                url.to_string(),
                FetchedPage {
                    title: title.to_string(),
                    paragraph_text: text.to_string(),
                },
            );
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            self.pages
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::Fetch(format!("host unreachable: {}", url)))
        }
    }

    async fn test_app(extra: &str) -> (TempDir, Arc<StubFetcher>, App) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let config: Config = toml::from_str(&format!(
            "db_path = {:?}\n{}",
            db_path.to_str().unwrap(),
            extra
        ))
        .unwrap();
        let repository = Repository::new(&config.db_path).await.unwrap();
        let fetcher = Arc::new(StubFetcher::default());
        let app = App::from_parts(&config, repository, fetcher.clone());
        (dir, fetcher, app)
    }

    #[tokio::test]
    async fn submit_fetches_and_stores() {
        let (_dir, fetcher, app) = test_app("").await;
        fetcher.serve("https://news.example.com/1", "Flood warning", "Rivers rising fast.");

        let article = app.submit_url("https://news.example.com/1").await.unwrap();
        assert_eq!(article.title, "Flood warning");
        assert_eq!(article.content, "Rivers rising fast.");

        let listed = app.list_articles().await.unwrap();
        assert_eq!(listed, vec![article.clone()]);
        assert_eq!(
            app.article_by_url("https://news.example.com/1").await.unwrap(),
            Some(article)
        );
    }

    #[tokio::test]
    async fn submit_propagates_fetch_and_empty_errors() {
        let (_dir, fetcher, app) = test_app("").await;
        fetcher.serve("https://news.example.com/blank", "", "");

        assert!(matches!(
            app.submit_url("https://news.example.com/missing").await,
            Err(AppError::Fetch(_))
        ));
        assert!(matches!(
            app.submit_url("https://news.example.com/blank").await,
            Err(AppError::EmptyContent { .. })
        ));
        assert!(matches!(app.submit_url("").await, Err(AppError::InvalidInput(_))));
        assert!(app.list_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_submit_keeps_order_and_isolates_failures() {
        let (_dir, fetcher, app) = test_app("max_concurrent_fetches = 2").await;
        fetcher.serve("https://a.example/1", "One", "first body");
        fetcher.serve("https://a.example/3", "Three", "third body");

        let results = app
            .submit_urls(vec![
                "https://a.example/1".to_string(),
                "https://a.example/2".to_string(),
                "https://a.example/3".to_string(),
            ])
            .await;

        let urls: Vec<_> = results.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/1", "https://a.example/2", "https://a.example/3"]);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(AppError::Fetch(_))));
        assert!(results[2].1.is_ok());
        assert_eq!(app.list_articles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn keywords_use_configured_stopwords() {
        let (_dir, fetcher, app) = test_app("extra_stopwords = [\"Reuters\"]").await;
        fetcher.serve("https://a.example/1", "Reuters: vaccine rollout", "vaccine supply Reuters");
        fetcher.serve("https://a.example/2", "Vaccine doubts", "rollout slows");
        app.submit_url("https://a.example/1").await.unwrap();
        app.submit_url("https://a.example/2").await.unwrap();

        // Newest article is read first, so "rollout" is seen before "vaccine"
        let keywords = app.top_keywords(None).await.unwrap();
        assert_eq!(keywords[0], KeywordCount::new("rollout", 2));
        assert_eq!(keywords[1], KeywordCount::new("vaccine", 2));
        assert!(keywords.iter().all(|k| k.word != "Reuters"));
    }

    #[tokio::test]
    async fn related_is_capped_and_search_is_not() {
        let (_dir, fetcher, app) = test_app("related_limit = 2").await;
        for i in 0..4 {
            let url = format!("https://a.example/{}", i);
            fetcher.serve(&url, &format!("Storm update {}", i), "heavy rain");
            app.submit_url(&url).await.unwrap();
        }

        assert_eq!(app.related_articles("storm").await.unwrap().len(), 2);
        assert_eq!(app.search("RAIN").await.unwrap().len(), 4);
        assert!(matches!(app.search("  ").await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let (_dir, _fetcher, app) = test_app("").await;
        assert!(matches!(app.delete_article(9999).await, Err(AppError::NotFound(9999))));
    }
}
