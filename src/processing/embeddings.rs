//! Embedding providers built on Model2Vec, plus an offline fallback

use crate::config::ModelConfig;
use crate::error::{Result, ScreenerError};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Model name that selects the offline feature-hashing provider instead of
/// a Model2Vec model.
pub const HASHING_PROVIDER_NAME: &str = "hashing";

const DIMENSION_PROBE: &str = "dimension probe";

/// A source of fixed-dimension text embeddings.
///
/// Providers are deterministic: the same text always embeds to the same
/// vector for the lifetime of the provider. Empty text embeds to the zero
/// vector of the provider's dimension.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn dimension(&self) -> usize;
    fn name(&self) -> &str;
}

/// Load the provider selected by the model configuration.
pub fn load_provider(config: &ModelConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    if config.embedding_model == HASHING_PROVIDER_NAME {
        log::debug!("Using offline feature-hashing embedding provider");
        return Ok(Arc::new(HashingProvider::new()));
    }

    let provider = Model2VecProvider::load(&config.embedding_model, &config.models_dir)?;
    Ok(Arc::new(provider))
}

/// Embedding provider backed by a Model2Vec static model.
pub struct Model2VecProvider {
    model: StaticModel,
    dimension: usize,
    name: String,
}

impl Model2VecProvider {
    /// Load a model from `models_dir` when a matching directory exists,
    /// otherwise treat `model_ref` as a Hugging Face repo id.
    pub fn load(model_ref: &str, models_dir: &Path) -> Result<Self> {
        let start_time = Instant::now();

        let local_path = models_dir.join(model_ref);
        let source = if local_path.exists() {
            local_path.as_path()
        } else {
            Path::new(model_ref)
        };

        log::info!("Loading embedding model from {}", source.display());

        let model = StaticModel::from_pretrained(source, None, None, None).map_err(|e| {
            ScreenerError::ModelLoading(format!(
                "Failed to load embedding model '{}': {}",
                model_ref, e
            ))
        })?;

        let dimension = model.encode_single(DIMENSION_PROBE).len();
        if dimension == 0 {
            return Err(ScreenerError::ModelLoading(format!(
                "Model '{}' produced an empty embedding",
                model_ref
            )));
        }

        log::debug!(
            "Model loaded in {:.2?} (dimension {})",
            start_time.elapsed(),
            dimension
        );

        Ok(Self {
            model,
            dimension,
            name: model_ref.to_string(),
        })
    }
}

impl EmbeddingProvider for Model2VecProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let embedding = self.model.encode_single(text);
        if embedding.len() != self.dimension {
            return Err(ScreenerError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Deterministic bag-of-words provider with no model files.
///
/// Each whitespace token is FNV-1a hashed into one of `dimension` buckets
/// and counted. Useful for offline runs and for tests that need stable
/// embeddings without model downloads.
pub struct HashingProvider {
    dimension: usize,
}

pub const DEFAULT_HASHING_DIMENSION: usize = 64;

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HashingProvider {
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_HASHING_DIMENSION,
        }
    }

    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(ScreenerError::InvalidInput(
                "Hashing provider dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for &byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }
}

impl EmbeddingProvider for HashingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dimension];
        for token in text.split_whitespace() {
            let bucket = (Self::fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        HASHING_PROVIDER_NAME
    }
}

/// Per-run embedding cache keyed by normalized text.
///
/// Scoped to a single ranking run; a new run starts with an empty cache.
pub struct EmbeddingCache {
    entries: Mutex<HashMap<String, Vec<f32>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Return the cached embedding for `text`, computing and storing it on
    /// a miss. Two tasks racing on the same text may both compute it; the
    /// result is identical either way.
    pub fn get_or_embed(&self, text: &str, provider: &dyn EmbeddingProvider) -> Result<Vec<f32>> {
        if let Some(embedding) = self.lock_entries().get(text).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(embedding);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let embedding = provider.embed(text)?;
        self.lock_entries()
            .entry(text.to_string())
            .or_insert_with(|| embedding.clone());
        Ok(embedding)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock_entries().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<f32>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
