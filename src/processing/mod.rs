//! Text processing and ranking module

pub mod document;
pub mod embeddings;
pub mod entities;
pub mod normalizer;
pub mod ranker;
pub mod screener;

pub use document::{Document, DocumentRole};
pub use ranker::{ScoredResult, SkippedCandidate};
pub use screener::{CancelToken, Screener};
