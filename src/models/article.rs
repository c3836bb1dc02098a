use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored news page, unique by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub domain: String,
    pub keywords: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Title and content joined the way the keyword pipeline reads them.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// Values written by an upsert. `published_at` doubles as `created_at` when
/// the URL has not been seen before.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub domain: String,
    pub keywords: Vec<String>,
    pub published_at: DateTime<Utc>,
}
