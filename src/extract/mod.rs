//! Orchestration primitives: bounded waits, hydration parsing, and
//! out-of-band chart fetches.

pub mod charts;
pub mod hydration;
pub mod wait;

pub use wait::{expand_section, poll_until, wait_for_chart, PollOutcome, WaitResult};
