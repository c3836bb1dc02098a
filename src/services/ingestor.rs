use std::sync::Arc;

use chrono::{DateTime, Utc};
use url::Url;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::keywords::KeywordPipeline;
use crate::models::{Article, NewArticle};

/// Turns already-fetched page text into a stored [`Article`].
pub struct ScrapeIngestor {
    repository: Repository,
    pipeline: Arc<KeywordPipeline>,
    keywords_per_article: usize,
}

impl ScrapeIngestor {
    pub fn new(
        repository: Repository,
        pipeline: Arc<KeywordPipeline>,
        keywords_per_article: usize,
    ) -> Self {
        Self {
            repository,
            pipeline,
            keywords_per_article,
        }
    }

    pub async fn ingest(&self, url: &str, raw_title: &str, raw_text: &str) -> Result<Article> {
        self.ingest_at(url, raw_title, raw_text, Utc::now()).await
    }

    /// Creates the article, or replaces title/content/domain/keywords/timestamp
    /// of the one already stored under `url`. Nothing is written when either
    /// the title or the text is blank.
    pub async fn ingest_at(
        &self,
        url: &str,
        raw_title: &str,
        raw_text: &str,
        now: DateTime<Utc>,
    ) -> Result<Article> {
        let url = url.trim();
        let domain = domain_of(url)?;

        let title = raw_title.trim();
        let content = raw_text.trim();
        if title.is_empty() || content.is_empty() {
            return Err(AppError::EmptyContent {
                url: url.to_string(),
            });
        }

        let keywords = self
            .pipeline
            .extract(&format!("{} {}", title, content), self.keywords_per_article)
            .into_iter()
            .map(|k| k.word)
            .collect();

        let existing = self.repository.find_by_url(url).await?;

        let article = self
            .repository
            .upsert_article(NewArticle {
                url: url.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                domain,
                keywords,
                published_at: now,
            })
            .await?;

        match existing {
            Some(_) => tracing::info!(id = article.id, url, "Updated article"),
            None => tracing::info!(id = article.id, url, "Created article"),
        }

        Ok(article)
    }
}

/// Host component of `url`; scheme, port and path are discarded.
pub fn domain_of(url: &str) -> Result<String> {
    if url.is_empty() {
        return Err(AppError::InvalidInput("url must not be empty".to_string()));
    }
    let parsed = Url::parse(url)
        .map_err(|e| AppError::InvalidInput(format!("invalid url {}: {}", url, e)))?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput(format!("url has no host: {}", url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;
    use tokio_test::assert_err;

    async fn test_ingestor() -> (TempDir, Repository, ScrapeIngestor) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.db");
        let repo = Repository::new(path.to_str().unwrap()).await.unwrap();
        let ingestor = ScrapeIngestor::new(repo.clone(), Arc::new(KeywordPipeline::default()), 3);
        (dir, repo, ingestor)
    }

    #[test]
    fn domain_is_host_only() {
        assert_eq!(
            domain_of("https://www.example.co.kr:8443/news/1?x=y").unwrap(),
            "www.example.co.kr"
        );
        assert!(matches!(domain_of(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(domain_of("not a url"), Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn first_ingest_creates_with_matching_timestamps() {
        let (_dir, _repo, ingestor) = test_ingestor().await;
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();

        let article = ingestor
            .ingest_at(
                "https://news.example.com/tariffs",
                " Tariff talks resume ",
                "Tariff negotiators met again. Tariff relief is expected.",
                now,
            )
            .await
            .unwrap();

        assert_eq!(article.title, "Tariff talks resume");
        assert_eq!(article.domain, "news.example.com");
        assert_eq!(article.published_at, now);
        assert_eq!(article.created_at, now);
        assert_eq!(article.keywords[0], "Tariff");
        assert!(article.keywords.len() <= 3);
    }

    #[tokio::test]
    async fn reingest_replaces_fields_of_the_single_row() {
        let (_dir, repo, ingestor) = test_ingestor().await;
        let url = "https://news.example.com/story";
        let first_at = Utc.with_ymd_and_hms(2026, 10, 10, 8, 0, 0).unwrap();
        let second_at = first_at + Duration::hours(5);

        let first = ingestor
            .ingest_at(url, "Draft headline", "early copy", first_at)
            .await
            .unwrap();
        let second = ingestor
            .ingest_at(url, "Final headline", "corrected copy", second_at)
            .await
            .unwrap();

        let stored = repo.get_all_articles().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], second);
        assert_eq!(second.id, first.id);
        assert_eq!(second.title, "Final headline");
        assert_eq!(second.content, "corrected copy");
        assert_eq!(second.published_at, second_at);
        assert_eq!(second.created_at, first_at);
    }

    #[tokio::test]
    async fn empty_content_is_rejected_without_writing() {
        let (_dir, repo, ingestor) = test_ingestor().await;

        let result = ingestor.ingest("https://news.example.com/empty", "", "").await;
        assert!(matches!(result, Err(AppError::EmptyContent { .. })));

        assert_err!(
            ingestor
                .ingest("https://news.example.com/blank", "Title only", "   ")
                .await
        );
        assert!(repo.get_all_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_url_is_invalid_input() {
        let (_dir, repo, ingestor) = test_ingestor().await;
        let result = ingestor.ingest("  ", "Title", "Body").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(repo.get_all_articles().await.unwrap().is_empty());
    }
}
