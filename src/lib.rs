//! Extraction engine for LTT Labs GPU review articles.
//!
//! The site renders everything client-side behind collapsed sections and
//! lazily loaded charts, so extraction drives a real Chrome instance:
//! expand each section, wait for its charts to settle, read benchmark
//! session ids out of the Next.js hydration stream, then pull chart
//! payloads from the JSON API with the browser's own cookies.

pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod product;
pub mod sections;

pub use browser::{BrowserOptions, BrowserSession};
pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use models::{ArticleLink, ProductRecord};
pub use product::{fetch_article_list, fetch_product_details};
