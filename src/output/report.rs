//! Ranking report structure shared by every output format

use crate::processing::ranker::{ScoredResult, SkippedCandidate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The complete outcome of one screening run: ranked results, skipped
/// candidates, and run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub reference_id: String,
    /// Ranked candidates, best first.
    pub results: Vec<ScoredResult>,
    /// Candidates excluded from the ranking, sorted by id.
    pub skipped: Vec<SkippedCandidate>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub screener_version: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub weight_semantic: f32,
    pub weight_entity: f32,
    pub use_entities: bool,
    pub top_k: Option<usize>,
    /// Candidates passed in, before deduplication.
    pub candidates_total: usize,
    /// Candidates scored, before any `top_k` truncation.
    pub candidates_ranked: usize,
    pub candidates_skipped: usize,
    pub processing_time_ms: u64,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl RankingReport {
    pub fn top_result(&self) -> Option<&ScoredResult> {
        self.results.first()
    }

    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }
}
