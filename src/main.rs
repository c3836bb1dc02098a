use std::future::Future;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;

mod app;
mod cli;
mod config;
mod db;
mod error;
mod keywords;
mod models;
mod services;

use app::App;
use cli::{Cli, Command};
use config::Config;
use error::Result;
use models::{Article, KeywordCount};

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let app = App::new(&config).await?;

    let name = cli.command.name();
    timed(name, execute(&app, cli.command, cli.json)).await
}

/// Logs how long each command took, whatever the outcome.
async fn timed<F, T>(command: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = fut.await;
    let elapsed_ms = whole_millis(started.elapsed());
    match &result {
        Ok(_) => tracing::info!(command, elapsed_ms, "Command finished"),
        Err(e) => tracing::warn!(command, elapsed_ms, error = %e, "Command failed"),
    }
    result
}

fn whole_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

async fn execute(app: &App, command: Command, json: bool) -> Result<()> {
    match command {
        Command::List => {
            let articles = app.list_articles().await?;
            print_articles(&articles, json)?;
        }

        Command::Ingest { urls } => {
            let results = app.submit_urls(urls).await;
            let mut first_error = None;
            let mut stored = Vec::new();
            for (url, result) in results {
                match result {
                    Ok(article) => stored.push(article),
                    Err(e) => {
                        eprintln!("{}: {}", url, e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            print_articles(&stored, json)?;
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Command::Keywords { days } => {
            let keywords = app.top_keywords(days).await?;
            let days = days.unwrap_or_else(|| app.window_days());
            print_keywords(&keywords, days, json)?;
        }

        Command::Related { keyword } => {
            let articles = app.related_articles(&keyword).await?;
            print_articles(&articles, json)?;
        }

        Command::Search { query } => {
            let articles = app.search(&query).await?;
            print_articles(&articles, json)?;
        }

        Command::Show { url } => match app.article_by_url(&url).await? {
            Some(article) => print_article_detail(&article, json)?,
            None => println!("No article stored for {}", url),
        },

        Command::Delete { id } => {
            app.delete_article(id).await?;
            if !json {
                println!("Deleted article {}", id);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_articles(articles: &[Article], json: bool) -> Result<()> {
    if json {
        return print_json(articles);
    }
    if articles.is_empty() {
        println!("No articles.");
        return Ok(());
    }
    for article in articles {
        println!(
            "{:>5}  {}  {:<24}  {}",
            article.id,
            article.published_at.format("%Y-%m-%d %H:%M:%S"),
            article.domain,
            article.title
        );
    }
    Ok(())
}

fn print_article_detail(article: &Article, json: bool) -> Result<()> {
    if json {
        return print_json(article);
    }
    println!("{}", article.title);
    println!("{}", article.url);
    println!(
        "id {}  fetched {}  first seen {}",
        article.id,
        article.published_at.format("%Y-%m-%d %H:%M:%S"),
        article.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if !article.keywords.is_empty() {
        println!("keywords: {}", article.keywords.join(", "));
    }
    println!();
    println!("{}", article.content);
    Ok(())
}

fn print_keywords(keywords: &[KeywordCount], days: u32, json: bool) -> Result<()> {
    if json {
        return print_json(keywords);
    }
    if keywords.is_empty() {
        println!("No articles in the last {} days.", days);
        return Ok(());
    }
    println!("Top keywords, last {} days:", days);
    for (rank, keyword) in keywords.iter().enumerate() {
        println!("{:>3}. {:<20} {}", rank + 1, keyword.word, keyword.count);
    }
    Ok(())
}
