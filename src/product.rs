//! Page-level aggregation: one article URL in, one best-effort
//! [`ProductRecord`] out.

use chromiumoxide::Page;
use serde::Deserialize;
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::models::{ArticleLink, ProductRecord};
use crate::sections::{article, features, hardware, performance, productivity, test_configuration};

/// Extract a full product record from one article page.
///
/// Only a failed navigation is fatal. Section parsers run concurrently over
/// the shared page - their expand clicks touch disjoint DOM regions and all
/// other access is read-only - and each resolves to `None` on its own
/// failure, so the returned record may mix populated and absent
/// sub-records. That is expected output for pages lacking sections, not an
/// error.
pub async fn fetch_product_details(
    session: &BrowserSession,
    config: &ScrapeConfig,
    url: &str,
) -> Result<ProductRecord> {
    info!("Extracting product details from {}", url);

    let page = session.new_page().await?;
    let result = extract_on_page(session, config, &page, url).await;
    let _ = page.close().await;
    result
}

async fn extract_on_page(
    session: &BrowserSession,
    config: &ScrapeConfig,
    page: &Page,
    url: &str,
) -> Result<ProductRecord> {
    session.goto(page, url).await?;

    let (info, links, overview, (good_points, bad_points, other_points)) = tokio::join!(
        article::parse_article_info(page),
        article::parse_links(page),
        article::parse_overview(page),
        article::parse_points(page),
    );

    if info.title.is_none() {
        warn!("No article title found at {}; page variant unknown", url);
    }

    let (hardware, features_and_software, performance, productivity_and_efficiency, test_configuration) = tokio::join!(
        hardware::parse(config, page),
        features::parse(config, page),
        performance::parse(session, config, page, url),
        productivity::parse(session, config, page, url),
        test_configuration::parse(config, page),
    );

    Ok(ProductRecord {
        name: info.title,
        author: info.author,
        tested_by: info.tested_by,
        published: info.published,
        overview,
        good_points,
        bad_points,
        other_points,
        links,
        hardware,
        features_and_software,
        performance,
        productivity_and_efficiency,
        test_configuration,
    })
}

/// List the articles on a category page.
pub async fn fetch_article_list(
    session: &BrowserSession,
    config: &ScrapeConfig,
    category: &str,
) -> Result<Vec<ArticleLink>> {
    let url = config.category_url(category);
    let page = session.new_page().await?;
    let result = list_on_page(session, config, &page, &url).await;
    let _ = page.close().await;
    result
}

async fn list_on_page(
    session: &BrowserSession,
    config: &ScrapeConfig,
    page: &Page,
    url: &str,
) -> Result<Vec<ArticleLink>> {
    session.goto(page, url).await?;

    let script = r#"
        (function() {
            return Array.from(
                document.querySelectorAll('a[data-testid="article-card"]')
            ).map(a => ({
                name: (a.getAttribute('aria-label') || '').trim() || null,
                href: a.getAttribute('href')
            }));
        })()
    "#;

    #[derive(Deserialize)]
    struct RawCard {
        name: Option<String>,
        href: Option<String>,
    }

    let cards: Vec<RawCard> = page.evaluate(script).await?.into_value()?;
    let base = url::Url::parse(&config.base_url).ok();

    let links = cards
        .into_iter()
        .filter_map(|card| {
            let name = card.name?;
            let href = card.href?;
            let absolute = match &base {
                Some(base) => base.join(&href).ok()?.to_string(),
                None => href,
            };
            Some(ArticleLink {
                name,
                url: absolute,
            })
        })
        .collect();

    Ok(links)
}
