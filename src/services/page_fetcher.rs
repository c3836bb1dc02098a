use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static HEADLINE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("h1 selector is valid"));
static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("p selector is valid"));

/// Raw text pulled from one page. Either field may be empty; deciding whether
/// that is acceptable is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    pub paragraph_text: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            tracing::debug!("Failed to fetch {}: {}", url, response.status());
            return Err(AppError::Fetch(format!("HTTP {} from {}", response.status(), url)));
        }

        let html = response.text().await?;
        let page = extract_page(&html);
        tracing::debug!(
            url,
            title_chars = page.title.chars().count(),
            text_chars = page.paragraph_text.chars().count(),
            "Extracted page text"
        );
        Ok(page)
    }
}

/// Title from `<title>` (falling back to the first `<h1>`), body from every
/// `<p>` joined with single spaces.
pub fn extract_page(html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    let title = first_text(&document, &TITLE_SELECTOR)
        .or_else(|| first_text(&document, &HEADLINE_SELECTOR))
        .unwrap_or_default();

    let paragraph_text = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    FetchedPage {
        title,
        paragraph_text,
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_paragraphs() {
        let html = r#"
            <html>
              <head><title>  Rates held
                steady </title></head>
              <body>
                <h1>Ignored headline</h1>
                <p>The central bank <b>held</b> rates.</p>
                <p>   </p>
                <p>Markets
                   rallied.</p>
              </body>
            </html>"#;

        let page = extract_page(html);
        assert_eq!(page.title, "Rates held steady");
        assert_eq!(page.paragraph_text, "The central bank held rates. Markets rallied.");
    }

    #[test]
    fn falls_back_to_headline_when_title_missing() {
        let page = extract_page("<body><h1>속보 </h1><p>내용</p></body>");
        assert_eq!(page.title, "속보");
        assert_eq!(page.paragraph_text, "내용");
    }

    #[test]
    fn page_without_text_yields_empty_fields() {
        assert_eq!(extract_page("<html><body><div>nav</div></body></html>"), FetchedPage::default());
    }
}
