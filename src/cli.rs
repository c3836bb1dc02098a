//! Command-line interface definitions for news-analyzer.

use clap::{Parser, Subcommand};

/// Scrape news articles into SQLite and surface keyword statistics and search.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List stored articles, newest first
    List,

    /// Fetch and store (or refresh) articles
    Ingest {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Top keywords over the trailing window
    Keywords {
        /// Window length in days (defaults to `keyword_window_days` from config)
        #[arg(value_parser = clap::value_parser!(u32))]
        days: Option<u32>,
    },

    /// Recent articles mentioning a keyword
    Related { keyword: String },

    /// All articles containing the query in title or content
    Search { query: String },

    /// Show the stored article for a url
    Show { url: String },

    /// Delete an article by id
    Delete {
        #[arg(value_parser = clap::value_parser!(i64))]
        id: i64,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Ingest { .. } => "ingest",
            Command::Keywords { .. } => "keywords",
            Command::Related { .. } => "related",
            Command::Search { .. } => "search",
            Command::Show { .. } => "show",
            Command::Delete { .. } => "delete",
        }
    }
}
