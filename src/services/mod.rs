mod ingestor;
mod page_fetcher;

pub use ingestor::ScrapeIngestor;
pub use page_fetcher::{FetchedPage, HttpPageFetcher, PageFetcher};
