//! Per-section parsers for the article page.
//!
//! Every parser returns `Option`: a missing section root, a failed
//! expansion, or an empty result all collapse to `None` so the aggregate
//! stays best-effort. Parsers only read the DOM; the one mutation (the
//! expand click) happens through the section expander before any read.

pub mod article;
pub mod features;
pub mod hardware;
pub mod performance;
pub mod productivity;
pub mod test_configuration;
