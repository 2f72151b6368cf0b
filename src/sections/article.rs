//! Article-level parsers: byline metadata, purchase links, overview text and
//! the good/bad/other point lists. These read statically rendered content
//! and need no section expansion.

use std::collections::BTreeMap;

use chromiumoxide::Page;
use serde::Deserialize;
use tracing::warn;

use crate::models::ArticleInfo;

/// Byline metadata. Author and tested-by share a selector with the
/// published-date block and are told apart by position; both are rendered
/// with a leading dash that gets stripped here.
pub async fn parse_article_info(page: &Page) -> ArticleInfo {
    let script = r#"
        (function() {
            const titleEl = document.querySelector('h1[data-testid="article-title"]');
            const title = titleEl ? (titleEl.textContent || '').trim() || null : null;
            if (!title) {
                return { title: null, author: null, testedBy: null, published: null };
            }
            const metaSelector =
                'h1[data-testid="article-title"] + div > div:nth-child(1) span:nth-child(2)';
            const meta = Array.from(document.querySelectorAll(metaSelector))
                .map(el => (el.textContent || '').trim());
            const publishedEl = document.querySelector(metaSelector + ' + div button');
            return {
                title: title,
                author: meta.length >= 3 ? meta[0] : null,
                testedBy: meta.length >= 3 ? meta[1] : null,
                published: publishedEl ? (publishedEl.textContent || '').trim() || null : null
            };
        })()
    "#;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawInfo {
        title: Option<String>,
        author: Option<String>,
        tested_by: Option<String>,
        published: Option<String>,
    }

    let raw = match page.evaluate(script).await {
        Ok(result) => match result.into_value::<RawInfo>() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Article info had unexpected shape: {}", e);
                return ArticleInfo::default();
            }
        },
        Err(e) => {
            warn!("Could not read article info: {}", e);
            return ArticleInfo::default();
        }
    };

    let clean = |s: Option<String>| {
        s.map(|v| v.trim_start_matches('-').trim().to_string())
            .filter(|v| !v.is_empty())
    };

    ArticleInfo {
        title: raw.title,
        author: clean(raw.author),
        tested_by: clean(raw.tested_by),
        published: raw.published,
    }
}

/// Purchase links, keyed by the retailer name from the link's image alt.
pub async fn parse_links(page: &Page) -> BTreeMap<String, String> {
    let script = r#"
        (function() {
            return Array.from(document.querySelectorAll('a[title*="Buy it on"]'))
                .map(a => {
                    const img = a.querySelector('img');
                    return {
                        title: img ? (img.alt || '').trim() || null : null,
                        url: a.getAttribute('href')
                    };
                });
        })()
    "#;

    #[derive(Deserialize)]
    struct RawLink {
        title: Option<String>,
        url: Option<String>,
    }

    let raw: Vec<RawLink> = match page.evaluate(script).await {
        Ok(result) => result.into_value().unwrap_or_default(),
        Err(e) => {
            warn!("Could not read purchase links: {}", e);
            Vec::new()
        }
    };

    raw.into_iter()
        .filter_map(|link| Some((link.title?, link.url?)))
        .collect()
}

/// Overview paragraphs joined into one string.
pub async fn parse_overview(page: &Page) -> Option<String> {
    let script = r#"
        (function() {
            const header = document.querySelector(
                'h2.text-3xl.font-extrabold.text-custom-category');
            if (!header || !header.parentElement) return null;
            const container = header.parentElement.nextElementSibling;
            if (!container) return null;
            const paragraphs = container.querySelectorAll('p');
            if (!paragraphs.length) return null;
            const text = Array.from(paragraphs)
                .map(p => (p.textContent || '').trim())
                .filter(t => t)
                .join(' ');
            return text || null;
        })()
    "#;

    match page.evaluate(script).await {
        Ok(result) => result.into_value().unwrap_or(None),
        Err(e) => {
            warn!("Could not read overview: {}", e);
            None
        }
    }
}

/// The "what you need to know" lists: (good, bad, other) points, located by
/// their colored marker icons, each item rendered as "title: description".
pub async fn parse_points(page: &Page) -> (Vec<String>, Vec<String>, Vec<String>) {
    let script = r#"
        (function() {
            const byColor = (color) => {
                const icon = document.querySelector(
                    'div.flex.h-5.w-5.items-center.justify-center.rounded-full.' + color);
                const container = icon && icon.parentNode
                    ? icon.parentNode.parentNode : null;
                if (!container) return [];
                return Array.from(container.querySelectorAll('ul li')).map(li => {
                    const title = li.querySelector('span');
                    const description = li.querySelector('p');
                    return ((title ? (title.textContent || '').trim() : '') + ': '
                        + (description ? (description.textContent || '').trim() : ''));
                });
            };
            return {
                good: byColor('bg-green-500'),
                bad: byColor('bg-red-500'),
                other: byColor('bg-neutral-400')
            };
        })()
    "#;

    #[derive(Deserialize, Default)]
    struct RawPoints {
        good: Vec<String>,
        bad: Vec<String>,
        other: Vec<String>,
    }

    let raw: RawPoints = match page.evaluate(script).await {
        Ok(result) => result.into_value().unwrap_or_default(),
        Err(e) => {
            warn!("Could not read article points: {}", e);
            RawPoints::default()
        }
    };

    (raw.good, raw.bad, raw.other)
}
