//! labscrape - LTT Labs GPU review extraction tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labscrape::{
    fetch_article_list, fetch_product_details, BrowserOptions, BrowserSession, ProductRecord,
    ScrapeConfig,
};

#[derive(Parser)]
#[command(name = "labscrape")]
#[command(about = "Extract structured GPU review data from LTT Labs articles")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    headful: bool,

    /// Attach to an already-running Chrome devtools endpoint instead of
    /// launching one (http://host:port)
    #[arg(long, global = true, env = "LABSCRAPE_REMOTE_URL")]
    remote_url: Option<String>,

    /// Override the site origin
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// List the graphics card articles on the site
    List,

    /// Scrape one or more article URLs into a JSON file
    Scrape {
        /// Article URLs (scrapes every listed article if none given)
        urls: Vec<String>,
        /// Output file
        #[arg(short, long, default_value = "products.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if is_verbose() {
        "labscrape=info"
    } else {
        "labscrape=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ScrapeConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }

    let options = BrowserOptions {
        headless: !cli.headful,
        remote_url: cli.remote_url.clone(),
        ..Default::default()
    };
    let session = BrowserSession::start(options).await?;

    let result = match cli.command {
        Commands::List => cmd_list(&session, &config).await,
        Commands::Scrape { urls, out } => cmd_scrape(&session, &config, urls, out).await,
    };

    session.close().await;
    result
}

async fn cmd_list(session: &BrowserSession, config: &ScrapeConfig) -> anyhow::Result<()> {
    let articles = fetch_article_list(session, config, "graphics-cards").await?;

    if articles.is_empty() {
        println!("{} No articles found", style("!").yellow());
        return Ok(());
    }

    println!("{}", style("Graphics Card Articles").bold());
    for article in &articles {
        println!("  {}  {}", style(&article.name).cyan(), article.url);
    }
    println!("\n{} article(s)", articles.len());
    Ok(())
}

async fn cmd_scrape(
    session: &BrowserSession,
    config: &ScrapeConfig,
    urls: Vec<String>,
    out: PathBuf,
) -> anyhow::Result<()> {
    let urls = if urls.is_empty() {
        fetch_article_list(session, config, "graphics-cards")
            .await?
            .into_iter()
            .map(|a| a.url)
            .collect()
    } else {
        urls
    };

    let pb = ProgressBar::new(urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut products: Vec<ProductRecord> = Vec::with_capacity(urls.len());
    let mut failures = 0usize;

    for url in &urls {
        pb.set_message(short_name(url));
        match fetch_product_details(session, config, url).await {
            Ok(record) => products.push(record),
            Err(e) => {
                failures += 1;
                pb.println(format!("{} {}: {}", style("✗").red(), url, e));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let envelope = serde_json::json!({
        "scrapedAt": chrono::Utc::now().to_rfc3339(),
        "products": products,
    });
    std::fs::write(&out, serde_json::to_string_pretty(&envelope)?)?;

    println!(
        "{} Scraped {} of {} article(s) into {}",
        style("✓").green(),
        products.len(),
        urls.len(),
        out.display()
    );
    if failures > 0 {
        println!("{} {} article(s) failed", style("!").yellow(), failures);
    }
    Ok(())
}

/// Last path segment of a URL, for progress display.
fn short_name(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
