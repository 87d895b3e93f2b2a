//! Ranking engine coordinating normalization, embeddings, and entities

use crate::config::Config;
use crate::error::{Result, ScreenerError};
use crate::input::DocumentLoader;
use crate::output::report::{RankingReport, ReportMetadata};
use crate::processing::document::{dedup_by_id, Document, DocumentRole};
use crate::processing::embeddings::{load_provider, EmbeddingCache, EmbeddingProvider};
use crate::processing::entities::{EntityAnnotator, EntitySet, LexiconAnnotator};
use crate::processing::normalizer::{Normalizer, NormalizerOptions};
use crate::processing::ranker::{
    rank_candidates, CandidateProfile, ReferenceProfile, SkippedCandidate,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const DUPLICATE_ID_REASON: &str = "duplicate candidate id";

/// Cooperative cancellation handle for a ranking run.
///
/// Cancelling makes the run return [`ScreenerError::Cancelled`]; no partial
/// ranking is produced.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Screening engine that ranks candidate resumes against one reference job
/// description.
pub struct Screener {
    provider: Arc<dyn EmbeddingProvider>,
    annotator: Option<Arc<dyn EntityAnnotator>>,
    normalizer: Arc<Normalizer>,
    config: Config,
}

impl Screener {
    /// Create an engine with the embedding provider named in the config.
    pub fn new(config: &Config) -> Result<Self> {
        let provider = load_provider(&config.models)?;
        Self::with_provider(config, provider)
    }

    /// Create an engine around a caller-supplied provider. The rest of the
    /// pipeline behaves identically whatever the provider is.
    pub fn with_provider(config: &Config, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        config.ranking.validate()?;

        let annotator: Option<Arc<dyn EntityAnnotator>> = if config.ranking.use_entities {
            Some(Arc::new(LexiconAnnotator::new()?))
        } else {
            None
        };

        let normalizer = Arc::new(Normalizer::with_options(NormalizerOptions {
            strip_stop_words: config.processing.strip_stop_words,
        }));

        Ok(Self {
            provider,
            annotator,
            normalizer,
            config: config.clone(),
        })
    }

    /// Rank `candidates` against `reference`.
    ///
    /// Reference failures abort the run; per-candidate failures and
    /// duplicate ids are reported in the skip list instead. Candidates are
    /// embedded concurrently up to the configured limit, and the final
    /// ordering does not depend on completion order.
    pub async fn rank_documents(
        &self,
        reference: Document,
        candidates: Vec<Document>,
        cancel: &CancelToken,
    ) -> Result<RankingReport> {
        let start_time = Instant::now();

        if cancel.is_cancelled() {
            return Err(ScreenerError::Cancelled);
        }

        let candidates_total = candidates.len();
        let (kept, duplicates) = dedup_by_id(candidates);
        let mut skipped: Vec<SkippedCandidate> = duplicates
            .into_iter()
            .map(|candidate_id| {
                log::warn!("Skipping candidate {}: {}", candidate_id, DUPLICATE_ID_REASON);
                SkippedCandidate {
                    candidate_id,
                    reason: DUPLICATE_ID_REASON.to_string(),
                }
            })
            .collect();

        let cache = Arc::new(EmbeddingCache::new());

        let reference_id = reference.id.clone();
        let reference_profile = self
            .build_reference_profile(&reference, &cache)
            .map_err(|e| {
                ScreenerError::Reference(format!(
                    "Failed to process reference '{}': {}",
                    reference_id, e
                ))
            })?;
        let reference_dimension = reference_profile.embedding.len();

        if reference_profile.embedding.iter().all(|v| *v == 0.0) {
            log::warn!(
                "Reference '{}' produced a zero embedding; every similarity will be degenerate",
                reference_id
            );
        }

        if cancel.is_cancelled() {
            return Err(ScreenerError::Cancelled);
        }

        let ids: Vec<String> = kept.iter().map(|d| d.id.clone()).collect();
        let semaphore = Arc::new(Semaphore::new(self.config.processing.max_concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for (index, document) in kept.into_iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let annotator = self.annotator.clone();
            let normalizer = Arc::clone(&self.normalizer);
            let cache = Arc::clone(&cache);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, Err(ScreenerError::Cancelled)),
                };
                if cancel.is_cancelled() {
                    return (index, Err(ScreenerError::Cancelled));
                }

                let profile = embed_candidate(
                    &document,
                    provider.as_ref(),
                    annotator.as_deref(),
                    &normalizer,
                    &cache,
                    reference_dimension,
                );
                (index, profile)
            });
        }

        // Collected by input index so completion order cannot leak into
        // the result.
        let mut profiles: Vec<Option<CandidateProfile>> = Vec::with_capacity(ids.len());
        profiles.resize_with(ids.len(), || None);

        while let Some(joined) = join_set.join_next().await {
            let (index, outcome) = joined
                .map_err(|e| ScreenerError::Embedding(format!("Candidate task failed: {}", e)))?;

            match outcome {
                Ok(profile) => profiles[index] = Some(profile),
                Err(ScreenerError::Cancelled) => return Err(ScreenerError::Cancelled),
                Err(err @ ScreenerError::DimensionMismatch { .. }) => return Err(err),
                Err(e) => {
                    log::warn!("Skipping candidate {}: {}", ids[index], e);
                    skipped.push(SkippedCandidate {
                        candidate_id: ids[index].clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(ScreenerError::Cancelled);
        }

        let scored_inputs: Vec<CandidateProfile> = profiles.into_iter().flatten().collect();
        let candidates_ranked = scored_inputs.len();

        let results = rank_candidates(&reference_profile, scored_inputs, &self.config.ranking)?;

        skipped.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));

        let cache_stats = cache.stats();
        log::debug!(
            "Embedding cache: {} entries, {} hits, {} misses",
            cache_stats.entries,
            cache_stats.hits,
            cache_stats.misses
        );

        Ok(RankingReport {
            reference_id,
            results,
            skipped,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                screener_version: env!("CARGO_PKG_VERSION").to_string(),
                embedding_model: self.provider.name().to_string(),
                embedding_dimension: reference_dimension,
                weight_semantic: self.config.ranking.weight_semantic,
                weight_entity: self.config.ranking.weight_entity,
                use_entities: self.config.ranking.use_entities,
                top_k: self.config.ranking.top_k,
                candidates_total,
                candidates_ranked,
                candidates_skipped: candidates_total - candidates_ranked,
                processing_time_ms: start_time.elapsed().as_millis() as u64,
                cache_hits: cache_stats.hits,
                cache_misses: cache_stats.misses,
            },
        })
    }

    /// Load the reference and candidates from disk, then rank them.
    ///
    /// Candidate files that fail to load become skip entries alongside the
    /// engine's own skips; a reference that fails to load aborts the run.
    pub async fn rank_paths(
        &self,
        job_path: &Path,
        resume_paths: &[PathBuf],
        cancel: &CancelToken,
    ) -> Result<RankingReport> {
        let loader = DocumentLoader::new();

        let reference = loader
            .load_document(job_path, DocumentRole::Reference)
            .await
            .map_err(|e| {
                ScreenerError::Reference(format!(
                    "Failed to load reference '{}': {}",
                    job_path.display(),
                    e
                ))
            })?;

        let batch = loader.load_candidates(resume_paths).await;
        let load_skips = batch.skipped;

        let mut report = self
            .rank_documents(reference, batch.documents, cancel)
            .await?;

        report.metadata.candidates_total += load_skips.len();
        report.metadata.candidates_skipped += load_skips.len();
        report.skipped.extend(load_skips);
        report
            .skipped
            .sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));

        Ok(report)
    }

    fn build_reference_profile(
        &self,
        reference: &Document,
        cache: &EmbeddingCache,
    ) -> Result<ReferenceProfile> {
        let normalized = self.normalizer.normalize(&reference.raw_text);
        let embedding = cache.get_or_embed(&normalized, self.provider.as_ref())?;
        let entities = match &self.annotator {
            Some(annotator) => annotator.annotate(&normalized)?,
            None => EntitySet::new(),
        };

        Ok(ReferenceProfile {
            embedding,
            entities,
        })
    }
}

fn embed_candidate(
    document: &Document,
    provider: &dyn EmbeddingProvider,
    annotator: Option<&dyn EntityAnnotator>,
    normalizer: &Normalizer,
    cache: &EmbeddingCache,
    expected_dimension: usize,
) -> Result<CandidateProfile> {
    let normalized = normalizer.normalize(&document.raw_text);
    let embedding = cache.get_or_embed(&normalized, provider)?;

    if embedding.len() != expected_dimension {
        return Err(ScreenerError::DimensionMismatch {
            expected: expected_dimension,
            actual: embedding.len(),
        });
    }

    let entities = match annotator {
        Some(annotator) => annotator.annotate(&normalized)?,
        None => EntitySet::new(),
    };

    Ok(CandidateProfile {
        id: document.id.clone(),
        embedding,
        entities,
    })
}
