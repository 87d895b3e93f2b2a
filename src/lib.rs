//! Resume screener library
//!
//! Ranks a batch of candidate resumes against one job description by
//! embedding both into vectors and sorting candidates by cosine
//! similarity, optionally blended with lexicon entity overlap.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ScreenerError};
pub use output::report::RankingReport;
pub use processing::screener::{CancelToken, Screener};
