//! Report structures and output formatting

pub mod formatter;
pub mod report;

pub use formatter::{ReportGenerator, ResultFormatter};
pub use report::{RankingReport, ReportMetadata};
