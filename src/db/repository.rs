use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{Article, NewArticle};

use super::schema::SCHEMA;

const ARTICLE_COLUMNS: &str =
    "id, url, title, content, domain, keywords, published_at, created_at";

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Insert the article, or overwrite title/content/domain/keywords/timestamp
    /// of the row that already holds this url. `id` and `created_at` survive
    /// an update.
    pub async fn upsert_article(&self, article: NewArticle) -> Result<Article> {
        let keywords = serde_json::to_string(&article.keywords)?;
        let stamp = format_timestamp(article.published_at);

        let stored = self
            .conn
            .call(move |conn| {
                // IMMEDIATE takes the write lock up front so two writers never
                // both read "absent" for the same url.
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let stored = tx.query_row(
                    &format!(
                        r#"INSERT INTO articles (url, title, content, domain, keywords, published_at, created_at)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                           ON CONFLICT(url) DO UPDATE SET
                               title = excluded.title,
                               content = excluded.content,
                               domain = excluded.domain,
                               keywords = excluded.keywords,
                               published_at = excluded.published_at
                           RETURNING {ARTICLE_COLUMNS}"#
                    ),
                    params![
                        article.url,
                        article.title,
                        article.content,
                        article.domain,
                        keywords,
                        stamp,
                    ],
                    article_from_row,
                )?;
                tx.commit()?;
                Ok(stored)
            })
            .await?;
        Ok(stored)
    }

    pub async fn get_all_articles(&self) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY published_at DESC, id DESC"
                ))?;
                let articles = stmt
                    .query_map([], article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// Articles with `published_at >= cutoff`, newest first.
    pub async fn get_articles_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Article>> {
        let cutoff = format_timestamp(cutoff);
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {ARTICLE_COLUMNS} FROM articles
                       WHERE published_at >= ?1
                       ORDER BY published_at DESC, id DESC"#
                ))?;
                let articles = stmt
                    .query_map(params![cutoff], article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let url = url.to_string();
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ?1"
                ))?;
                let article = stmt
                    .query_row(params![url], article_from_row)
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    /// Case-insensitive substring match on title or content, newest first.
    /// `limit` of `None` returns every match.
    pub async fn search_articles(&self, query: &str, limit: Option<usize>) -> Result<Vec<Article>> {
        let pattern = like_pattern(query);
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {ARTICLE_COLUMNS} FROM articles
                       WHERE title LIKE ?1 ESCAPE '\' OR content LIKE ?1 ESCAPE '\'
                       ORDER BY published_at DESC, id DESC
                       LIMIT ?2"#
                ))?;
                let articles = stmt
                    .query_map(params![pattern, limit], article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn delete_article(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .call(move |conn| {
                let deleted = conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
                Ok(deleted)
            })
            .await?;

        if deleted == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }
}

/// Fixed-width UTC form so that string order in SQLite matches time order.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// Only the form written by `format_timestamp` is accepted; anything else would
// compare incorrectly against the cutoff string in `get_articles_since`.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", raw).into(),
        )
    })
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    let keywords: String = row.get(5)?;
    let keywords = serde_json::from_str(&keywords)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Article {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        domain: row.get(4)?,
        keywords,
        published_at: timestamp_column(row, 6)?,
        created_at: timestamp_column(row, 7)?,
    })
}

fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
