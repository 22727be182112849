//! Word vectors from a locally run embedding model, via fastembed.

use std::collections::HashMap;

use fastembed::{EmbeddingModel as FastEmbedModel, InitOptions, TextEmbedding};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::core::config::{EmbeddingConfig, EmbeddingModel};
use crate::core::errors::{DocAlignError, Result};

use super::EmbeddingLookup;

/// In-memory cache for word vectors (hash -> vector)
struct VectorCache {
    entries: HashMap<u64, Vec<f32>>,
    max_entries: usize,
    hits: usize,
    misses: usize,
}

impl VectorCache {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, hash: u64) -> Option<Vec<f32>> {
        if let Some(vec) = self.entries.get(&hash) {
            self.hits += 1;
            Some(vec.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    /// Inserts a vector, dropping half the cache when full.
    fn insert(&mut self, hash: u64, vector: Vec<f32>) {
        if self.entries.len() >= self.max_entries {
            let to_remove: Vec<u64> = self
                .entries
                .keys()
                .take(self.max_entries / 2 + 1)
                .copied()
                .collect();
            for key in to_remove {
                self.entries.remove(&key);
            }
        }
        self.entries.insert(hash, vector);
    }

    fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Embedding lookup backed by a fastembed text model.
///
/// Every word resolves to a vector, so the model never reports unknown
/// words; an inference failure degrades the single word to `None`.
pub struct ModelEmbeddings {
    model: Mutex<TextEmbedding>,
    dimension: usize,
    cache: RwLock<VectorCache>,
}

impl ModelEmbeddings {
    /// Initialize the configured model, downloading it if needed.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let mut init_options = InitOptions::new(config.model.to_fastembed_model())
            .with_show_download_progress(config.show_download_progress);
        if let Some(ref cache_dir) = config.cache_dir {
            init_options = init_options.with_cache_dir(cache_dir.into());
        }

        let model = TextEmbedding::try_new(init_options).map_err(|e| {
            DocAlignError::embedding_for(
                format!("Failed to initialize embedding model: {e}"),
                config.model.display_name(),
            )
        })?;
        info!("Initialized embedding model {}", config.model.display_name());

        Ok(Self {
            model: Mutex::new(model),
            dimension: config.model.dimension(),
            cache: RwLock::new(VectorCache::new(config.cache_entries)),
        })
    }

    /// Embed a single word, consulting the cache first.
    pub fn embed_word(&self, word: &str) -> Result<Vec<f32>> {
        let word = word.to_lowercase();
        let hash = xxh3_64(word.as_bytes());

        if let Some(vector) = self.cache.write().get(hash) {
            return Ok(vector);
        }

        let embeddings = self
            .model
            .lock()
            .embed(vec![word.as_str()], None)
            .map_err(|e| DocAlignError::embedding_for(format!("Embedding failed: {e}"), &word))?;
        let vector = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DocAlignError::embedding_for("Model returned no embedding", &word))?;

        self.cache.write().insert(hash, vector.clone());
        Ok(vector)
    }

    /// Cached entries and hit rate.
    pub fn cache_stats(&self) -> (usize, f64) {
        let cache = self.cache.read();
        (cache.entries.len(), cache.hit_rate())
    }
}

impl EmbeddingLookup for ModelEmbeddings {
    fn lookup(&self, word: &str) -> Option<Vec<f32>> {
        match self.embed_word(word) {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

impl EmbeddingModel {
    /// Convert to the fastembed model enum.
    pub fn to_fastembed_model(&self) -> FastEmbedModel {
        match self {
            EmbeddingModel::AllMiniLML6V2 => FastEmbedModel::AllMiniLML6V2,
            EmbeddingModel::AllMiniLML6V2Q => FastEmbedModel::AllMiniLML6V2Q,
            EmbeddingModel::BGESmallENV15 => FastEmbedModel::BGESmallENV15,
            EmbeddingModel::NomicEmbedTextV15 => FastEmbedModel::NomicEmbedTextV15,
        }
    }
}
